//! Vidlens Core
//!
//! Core types shared by the Vidlens client, tracker and CLI.
//!
//! This crate contains:
//! - Domain types: analysis jobs, their phases, and analysis results
//! - DTOs: wire shapes of the analysis backend's HTTP API

pub mod domain;
pub mod dto;
