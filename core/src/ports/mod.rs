//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with the operating system. Implementations live in `adapters`.

mod control;
mod launcher;
mod process_source;
mod window_source;

pub use control::{ProcessControlPort, WaitOutcome};
pub use launcher::{ElevatedKill, LauncherPort};
pub use process_source::ProcessSourcePort;
pub use window_source::WindowSourcePort;
