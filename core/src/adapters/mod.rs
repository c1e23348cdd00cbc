//! Adapters layer - Operating system implementations of the ports.
//!
//! Each supported platform provides a process source, a window source,
//! process control and a launcher. The `Platform*` aliases pick the ones
//! for the current target.

mod wmic;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "windows")]
mod win32;

#[cfg(target_os = "linux")]
pub use linux::{
    LinuxControl as PlatformControl, LinuxLauncher as PlatformLauncher,
    LinuxProcesses as PlatformProcesses, LinuxWindows as PlatformWindows,
};

#[cfg(target_os = "windows")]
pub use win32::{
    Win32Control as PlatformControl, Win32Launcher as PlatformLauncher,
    Win32Processes as PlatformProcesses, Win32Windows as PlatformWindows,
};

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
compile_error!("Unsupported platform: only Linux and Windows are supported");
