//! Process source port (interface).

use crate::domain::ProcessRecord;
use crate::error::Result;

/// Port for enumerating running processes.
///
/// Per-process query failures (typically access denied) must degrade to a
/// partial record; only a failure to enumerate at all is an error.
pub trait ProcessSourcePort: Send + Sync {
    /// Capture all running processes.
    fn capture(&self) -> impl std::future::Future<Output = Result<Vec<ProcessRecord>>> + Send;
}
