//! Delivery tracker module for feedcast.

pub mod repository;

pub use repository::DeliveryRepository;
