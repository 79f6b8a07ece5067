//! Data Transfer Objects for the analysis backend
//!
//! Request and response bodies exactly as they travel over HTTP. Domain
//! types are built from these by the client and tracker.

pub mod analysis;
pub mod saved;
