//! Linux adapters: `procfs` for processes, `wmctrl` for X11/EWMH windows,
//! signals through `nix`.

mod control;
mod launcher;
mod processes;
mod wmctrl;

pub use control::{LinuxControl, LinuxProcessHandle};
pub use launcher::LinuxLauncher;
pub use processes::LinuxProcesses;
pub use wmctrl::LinuxWindows;
