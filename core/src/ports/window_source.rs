//! Window source port (interface).

use crate::domain::WindowRecord;
use crate::error::Result;

/// Port for enumerating top-level windows that would appear in an
/// application switcher (no tool, hidden or owned windows).
pub trait WindowSourcePort: Send + Sync {
    /// Capture all switchable windows with their owning PIDs.
    fn capture(&self) -> impl std::future::Future<Output = Result<Vec<WindowRecord>>> + Send;
}
