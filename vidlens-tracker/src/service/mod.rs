//! Service layer
//!
//! Services turn completed jobs into displayable reports. They talk to the
//! backend only through the `AnalysisApi` seam.

mod result_fetcher;

pub use result_fetcher::{ResultFetcher, unwrap_payload};

pub(crate) use result_fetcher::attach_metadata;
