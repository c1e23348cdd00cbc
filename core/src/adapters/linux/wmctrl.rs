//! Window enumeration through `wmctrl -lp`.

use std::process::Stdio;

use regex::Regex;
use tokio::process::Command;

use crate::domain::{WindowHandle, WindowRecord};
use crate::error::{Error, Result};
use crate::ports::WindowSourcePort;

/// Lists top-level windows managed by an EWMH window manager.
#[derive(Debug, Default)]
pub struct LinuxWindows;

impl LinuxWindows {
    pub fn new() -> Self {
        Self
    }

    /// Parse `wmctrl -lp` output.
    ///
    /// Example:
    /// ```text
    /// 0x03a00007  0 2345   laptop Inbox - Mail
    /// 0x01e00003 -1 1187   laptop Top Panel
    /// ```
    ///
    /// Sticky windows (desktop `-1`: panels, docks, desktop) and windows
    /// without a known owner (pid `0`) are not switchable and are skipped,
    /// as are untitled windows.
    fn parse_wmctrl_output(output: &str) -> Result<Vec<WindowRecord>> {
        let regex = Regex::new(r"^0x([0-9a-fA-F]+)\s+(-?\d+)\s+(\d+)\s+\S+\s?(.*)$")
            .map_err(|e| Error::ParseError(format!("wmctrl pattern: {}", e)))?;

        let mut windows = Vec::new();
        for line in output.lines() {
            let Some(caps) = regex.captures(line) else {
                continue;
            };

            let Ok(handle) = isize::from_str_radix(&caps[1], 16) else {
                continue;
            };
            if &caps[2] == "-1" {
                continue;
            }
            let pid: u32 = match caps[3].parse() {
                Ok(0) | Err(_) => continue,
                Ok(p) => p,
            };
            let title = caps[4].trim();
            if title.is_empty() {
                continue;
            }

            windows.push(WindowRecord::new(WindowHandle(handle), pid, title));
        }

        Ok(windows)
    }
}

impl WindowSourcePort for LinuxWindows {
    async fn capture(&self) -> Result<Vec<WindowRecord>> {
        let output = Command::new("wmctrl")
            .arg("-lp")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::Enumeration(format!("Failed to run wmctrl: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Enumeration(format!(
                "wmctrl exited with {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_wmctrl_output(&stdout)
    }
}
