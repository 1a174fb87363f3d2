//! Feed item types for feedcast.

/// Maximum number of items ingested from a single fetch.
pub const MAX_ITEMS_PER_FETCH: usize = 100;

/// Maximum feed size in bytes (5MB).
pub const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// A single item pulled from the external feed.
///
/// Feed-assigned identifiers are deliberately ignored: two items with equal
/// canonical content are the same item for dedup purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Item title.
    pub title: String,
    /// Item body/summary.
    pub body: String,
}

impl FeedItem {
    /// Create a new feed item.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Canonical content of this item, used as its fingerprint.
    pub fn canonical_content(&self) -> String {
        canonical_content(&self.title, &self.body)
    }
}

/// Join title and body into the canonical content string.
///
/// The separator is a single space when the title already ends in terminal
/// punctuation, otherwise ". " - so "Storm hits!" never becomes
/// "Storm hits!. ...". An empty title or body yields the other part alone.
pub fn canonical_content(title: &str, body: &str) -> String {
    if title.is_empty() {
        return body.to_string();
    }
    if body.is_empty() {
        return title.to_string();
    }
    if title.ends_with(['.', '!', '?']) {
        format!("{title} {body}")
    } else {
        format!("{title}. {body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_content_plain_title() {
        assert_eq!(
            canonical_content("Storm hits city", "Flooding reported"),
            "Storm hits city. Flooding reported"
        );
    }

    #[test]
    fn test_canonical_content_terminal_punctuation() {
        assert_eq!(
            canonical_content("Storm hits!", "Flooding reported"),
            "Storm hits! Flooding reported"
        );
        assert_eq!(
            canonical_content("Storm hits.", "Flooding reported"),
            "Storm hits. Flooding reported"
        );
        assert_eq!(
            canonical_content("Storm hits?", "Flooding reported"),
            "Storm hits? Flooding reported"
        );
    }

    #[test]
    fn test_canonical_content_empty_parts() {
        assert_eq!(canonical_content("", "Flooding reported"), "Flooding reported");
        assert_eq!(canonical_content("Storm hits city", ""), "Storm hits city");
        assert_eq!(canonical_content("", ""), "");
    }

    #[test]
    fn test_same_content_same_fingerprint() {
        let a = FeedItem::new("Storm hits city", "Flooding reported");
        let b = FeedItem::new("Storm hits city", "Flooding reported");
        assert_eq!(a.canonical_content(), b.canonical_content());
    }

    #[test]
    fn test_distinct_content_distinct_fingerprint() {
        let a = FeedItem::new("Storm hits city", "Flooding reported");
        let b = FeedItem::new("Storm hits city", "Flooding reported.");
        assert_ne!(a.canonical_content(), b.canonical_content());
    }
}
