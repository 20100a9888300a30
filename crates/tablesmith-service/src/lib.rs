//! Service layer for Tablesmith

pub mod service;

pub use service::{BuilderService, BuilderServiceBuilder};
