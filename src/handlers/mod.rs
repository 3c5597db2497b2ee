pub mod extractors;
pub mod health;
pub mod lists;
pub mod metrics;

pub use extractors::{ItemSubmission, ListPath};
