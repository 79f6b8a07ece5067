//! Core domain types
//!
//! These types represent the entities the tracker reasons about: a remote
//! analysis job, the phase vocabulary it moves through, and the report it
//! eventually produces.

pub mod job;
pub mod result;
pub mod saved;
