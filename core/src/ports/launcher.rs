//! Launcher port (interface).

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A kill handed to an elevated OS helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElevatedKill {
    /// Kill every process with this executable name.
    ByName(String),
    /// Kill a single PID.
    ById(u32),
}

/// Port for starting processes.
///
/// Both operations are fire-and-forget: success means the launch call
/// itself did not fail, nothing more.
pub trait LauncherPort: Send + Sync {
    /// Start `program` with `args`, detached from this process.
    fn launch(
        &self,
        program: &str,
        args: &[String],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Run a forced kill through the OS elevation mechanism.
    fn launch_elevated(
        &self,
        request: &ElevatedKill,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
