//! Owned kernel handle.

use std::ffi::c_void;

use windows::Win32::Foundation::{CloseHandle, HANDLE};

/// A kernel handle closed on drop.
///
/// Stored as an integer so it can cross task boundaries.
#[derive(Debug)]
pub(super) struct OwnedHandle(isize);

impl OwnedHandle {
    pub(super) fn new(handle: HANDLE) -> Self {
        Self(handle.0 as isize)
    }

    pub(super) fn raw(&self) -> HANDLE {
        HANDLE(self.0 as *mut c_void)
    }

    pub(super) fn as_isize(&self) -> isize {
        self.0
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was returned by a successful open call and is
        // owned exclusively by this wrapper.
        unsafe {
            let _ = CloseHandle(self.raw());
        }
    }
}
