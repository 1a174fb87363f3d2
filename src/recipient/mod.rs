//! Recipient registry module for feedcast.

pub mod repository;

pub use repository::RecipientRepository;
