//! Terminal rendering
//!
//! Progress lines while a job runs, and the report once it is done.

mod progress;
mod report;

pub use progress::ProgressListener;
pub use report::{print_failure, print_result};
