//! Windows adapters built on the Win32 API.

mod control;
mod handle;
mod launcher;
mod processes;
mod switcher;

pub use control::{Win32Control, Win32ProcessHandle};
pub use launcher::Win32Launcher;
pub use processes::Win32Processes;
pub use switcher::Win32Windows;

/// Decode a UTF-16 buffer up to its first NUL.
fn from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}
