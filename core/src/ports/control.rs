//! Process control port (interface).

use std::time::Duration;

use crate::domain::WindowRecord;
use crate::error::{OpenError, Result};

/// Result of a bounded wait for process exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Exited,
    TimedOut,
}

/// Port for the per-process termination primitives.
///
/// The termination engine drives these through its state machine; adapters
/// only wrap the OS calls.
pub trait ProcessControlPort: Send + Sync {
    /// An open process handle. Dropping it releases OS resources.
    type Handle: Send + Sync + 'static;

    /// Open a process for termination. `synchronize` additionally requests
    /// the right to wait for its exit.
    fn open(
        &self,
        pid: u32,
        synchronize: bool,
    ) -> impl std::future::Future<Output = std::result::Result<Self::Handle, OpenError>> + Send;

    /// Ask the process to quit through its windowing system.
    ///
    /// Returns whether at least one close request was delivered.
    fn request_close(
        &self,
        handle: &Self::Handle,
        windows: &[WindowRecord],
    ) -> impl std::future::Future<Output = bool> + Send;

    /// Wait up to `timeout` for the process to exit.
    fn wait_exit(
        &self,
        handle: &Self::Handle,
        timeout: Duration,
    ) -> impl std::future::Future<Output = Result<WaitOutcome>> + Send;

    /// Check liveness directly, without waiting.
    fn is_alive(&self, handle: &Self::Handle) -> impl std::future::Future<Output = bool> + Send;

    /// Terminate the process unconditionally.
    fn terminate(&self, handle: &Self::Handle) -> impl std::future::Future<Output = Result<()>> + Send;
}
