//! Alt-tab window enumeration.

use std::ffi::c_void;

use tracing::debug;
use windows::core::w;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, TRUE};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetAncestor, GetClassNameW, GetPropW, GetWindowLongW, GetWindowTextLengthW,
    GetWindowTextW, GetWindowThreadProcessId, IsWindowVisible, GA_ROOTOWNER, GWL_EXSTYLE,
    WS_EX_APPWINDOW, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW,
};

use super::from_wide;
use crate::domain::{WindowHandle, WindowRecord};
use crate::error::{Error, Result};
use crate::ports::WindowSourcePort;

/// Window classes that are visible top-level windows but never switchable.
const IGNORED_CLASSES: &[&str] = &["Windows.UI.Core.CoreWindow", "Progman"];

/// Enumerates windows the way the task switcher shows them.
#[derive(Debug, Default)]
pub struct Win32Windows;

impl Win32Windows {
    pub fn new() -> Self {
        Self
    }

    fn capture_blocking() -> Result<Vec<WindowRecord>> {
        let mut windows: Vec<WindowRecord> = Vec::new();
        // SAFETY: the callback only runs during this call and the vector
        // outlives it.
        unsafe {
            EnumWindows(
                Some(collect_window),
                LPARAM(&mut windows as *mut Vec<WindowRecord> as isize),
            )
            .map_err(|e| Error::Enumeration(format!("EnumWindows: {}", e)))?;
        }
        debug!(count = windows.len(), "Switchable windows listed");
        Ok(windows)
    }
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam.0 as *mut Vec<WindowRecord>);
    if let Some(record) = switchable_window(hwnd) {
        windows.push(record);
    }
    TRUE
}

unsafe fn switchable_window(hwnd: HWND) -> Option<WindowRecord> {
    if !IsWindowVisible(hwnd).as_bool() {
        return None;
    }

    let title = window_title(hwnd)?;

    let ex_style = GetWindowLongW(hwnd, GWL_EXSTYLE) as u32;
    if ex_style & WS_EX_APPWINDOW.0 == 0 {
        if ex_style & (WS_EX_TOOLWINDOW.0 | WS_EX_NOACTIVATE.0) != 0 {
            return None;
        }
        let owner = GetAncestor(hwnd, GA_ROOTOWNER);
        if owner != hwnd && !owner.0.is_null() && IsWindowVisible(owner).as_bool() {
            return None;
        }
    }

    if !GetPropW(hwnd, w!("ITaskList_Deleted")).0.is_null() {
        return None;
    }

    let mut class = [0u16; 256];
    let len = GetClassNameW(hwnd, &mut class);
    if len > 0 && IGNORED_CLASSES.contains(&from_wide(&class[..len as usize]).as_str()) {
        return None;
    }

    let mut pid = 0u32;
    GetWindowThreadProcessId(hwnd, Some(&mut pid));
    if pid == 0 {
        return None;
    }

    Some(WindowRecord::new(
        WindowHandle(hwnd.0 as isize),
        pid,
        title,
    ))
}

unsafe fn window_title(hwnd: HWND) -> Option<String> {
    let len = GetWindowTextLengthW(hwnd);
    if len <= 0 {
        return None;
    }
    let mut buf = vec![0u16; len as usize + 1];
    let copied = GetWindowTextW(hwnd, &mut buf);
    let title = from_wide(&buf[..copied.max(0) as usize]);
    (!title.trim().is_empty()).then_some(title)
}

/// Convert a stored handle back to an `HWND`.
pub(super) fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

impl WindowSourcePort for Win32Windows {
    async fn capture(&self) -> Result<Vec<WindowRecord>> {
        tokio::task::spawn_blocking(Self::capture_blocking)
            .await
            .map_err(|e| Error::Enumeration(format!("window capture task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_windows() {
        let windows = Win32Windows::new().capture().await.unwrap();
        assert!(windows.iter().all(|w| w.owner_pid != 0 && !w.title.is_empty()));
    }
}
