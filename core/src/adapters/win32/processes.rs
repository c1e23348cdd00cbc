//! Process enumeration: WMI via `wmic` first, Toolhelp32 as fallback.

use std::ffi::c_void;
use std::mem::size_of;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};
use windows::core::PWSTR;
use windows::Wdk::System::Threading::{NtQueryInformationProcess, ProcessBasicInformation};
use windows::Win32::Foundation::{HANDLE, UNICODE_STRING};
use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PEB, PROCESS_BASIC_INFORMATION,
    PROCESS_NAME_WIN32, PROCESS_QUERY_INFORMATION, PROCESS_QUERY_LIMITED_INFORMATION,
    PROCESS_VM_READ, RTL_USER_PROCESS_PARAMETERS,
};

use super::from_wide;
use super::handle::OwnedHandle;
use crate::adapters::wmic;
use crate::domain::ProcessRecord;
use crate::error::{Error, Result};
use crate::ports::ProcessSourcePort;

const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Upper bound for a command line read from another process, in UTF-16 units.
const MAX_COMMAND_LINE_UNITS: usize = 32 * 1024;

/// Enumerates processes.
#[derive(Debug, Default)]
pub struct Win32Processes;

impl Win32Processes {
    pub fn new() -> Self {
        Self
    }

    /// Rich path: one WMI query returning every field.
    async fn capture_wmic() -> Result<Vec<ProcessRecord>> {
        let output = Command::new("wmic")
            .args([
                "process",
                "get",
                "ProcessId,Caption,Name,ExecutablePath,CommandLine",
                "/FORMAT:LIST",
            ])
            .creation_flags(CREATE_NO_WINDOW)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("Failed to run wmic: {}", e)))?;

        if !output.status.success() {
            return Err(Error::CommandFailed(format!(
                "wmic exited with {}",
                output.status
            )));
        }

        let records = wmic::parse_process_list(&wmic::decode_output(&output.stdout));
        if records.is_empty() {
            return Err(Error::ParseError("wmic listed no processes".to_string()));
        }
        Ok(records)
    }

    /// Fallback path: Toolhelp32 snapshot plus per-process queries.
    fn capture_toolhelp() -> Result<Vec<ProcessRecord>> {
        // SAFETY: plain Win32 calls on a snapshot handle we own; the entry
        // struct is initialised with its size as the API requires.
        unsafe {
            let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)
                .map_err(|e| Error::Enumeration(format!("CreateToolhelp32Snapshot: {}", e)))?;
            let snapshot = OwnedHandle::new(snapshot);

            let mut entry = PROCESSENTRY32W {
                dwSize: size_of::<PROCESSENTRY32W>() as u32,
                ..Default::default()
            };
            Process32FirstW(snapshot.raw(), &mut entry)
                .map_err(|e| Error::Enumeration(format!("Process32FirstW: {}", e)))?;

            let mut records = Vec::new();
            loop {
                let pid = entry.th32ProcessID;
                let name = from_wide(&entry.szExeFile);
                let (path, command_line) = query_process(pid);
                records.push(
                    ProcessRecord::new(pid, name)
                        .with_executable_path(path)
                        .with_command_line(command_line),
                );

                if Process32NextW(snapshot.raw(), &mut entry).is_err() {
                    break;
                }
            }
            Ok(records)
        }
    }
}

/// Image path and command line of `pid`, as far as our rights allow.
fn query_process(pid: u32) -> (Option<PathBuf>, Option<String>) {
    // SAFETY: handles returned by OpenProcess are owned and closed on drop.
    unsafe {
        if let Ok(handle) = OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, false, pid) {
            let handle = OwnedHandle::new(handle);
            return (image_path(handle.raw()), read_command_line(handle.raw()));
        }
        if let Ok(handle) = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
            let handle = OwnedHandle::new(handle);
            return (image_path(handle.raw()), None);
        }
    }
    (None, None)
}

unsafe fn image_path(handle: HANDLE) -> Option<PathBuf> {
    let mut buf = [0u16; 1024];
    let mut len = buf.len() as u32;
    QueryFullProcessImageNameW(handle, PROCESS_NAME_WIN32, PWSTR(buf.as_mut_ptr()), &mut len)
        .ok()?;
    Some(PathBuf::from(String::from_utf16_lossy(&buf[..len as usize])))
}

/// Read `PEB->ProcessParameters->CommandLine` from another process.
///
/// Any failure, including layout mismatches producing nonsense lengths,
/// means the command line is unavailable.
unsafe fn read_command_line(handle: HANDLE) -> Option<String> {
    let mut info = PROCESS_BASIC_INFORMATION::default();
    let mut returned = 0u32;
    NtQueryInformationProcess(
        handle,
        ProcessBasicInformation,
        &mut info as *mut _ as *mut c_void,
        size_of::<PROCESS_BASIC_INFORMATION>() as u32,
        &mut returned,
    )
    .ok()
    .ok()?;
    if info.PebBaseAddress.is_null() {
        return None;
    }

    let peb: PEB = read_struct(handle, info.PebBaseAddress as *const c_void)?;
    if peb.ProcessParameters.is_null() {
        return None;
    }
    let params: RTL_USER_PROCESS_PARAMETERS =
        read_struct(handle, peb.ProcessParameters as *const c_void)?;

    let UNICODE_STRING { Length, Buffer, .. } = params.CommandLine;
    let units = Length as usize / 2;
    if units == 0 || units > MAX_COMMAND_LINE_UNITS || Buffer.is_null() {
        return None;
    }

    let mut buf = vec![0u16; units];
    let mut read = 0usize;
    ReadProcessMemory(
        handle,
        Buffer.0 as *const c_void,
        buf.as_mut_ptr() as *mut c_void,
        units * 2,
        Some(&mut read as *mut usize),
    )
    .ok()?;
    if read != units * 2 {
        return None;
    }
    Some(String::from_utf16_lossy(&buf))
}

unsafe fn read_struct<T: Default>(handle: HANDLE, address: *const c_void) -> Option<T> {
    let mut value = T::default();
    let mut read = 0usize;
    ReadProcessMemory(
        handle,
        address,
        &mut value as *mut T as *mut c_void,
        size_of::<T>(),
        Some(&mut read as *mut usize),
    )
    .ok()?;
    (read == size_of::<T>()).then_some(value)
}

impl ProcessSourcePort for Win32Processes {
    async fn capture(&self) -> Result<Vec<ProcessRecord>> {
        match Self::capture_wmic().await {
            Ok(records) => {
                debug!(count = records.len(), "Processes listed through wmic");
                return Ok(records);
            }
            Err(e) => warn!(error = %e, "wmic unavailable, falling back to Toolhelp32"),
        }

        tokio::task::spawn_blocking(Self::capture_toolhelp)
            .await
            .map_err(|e| Error::Enumeration(format!("process capture task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolhelp_lists_current_process() {
        let records = Win32Processes::capture_toolhelp().unwrap();
        let me = records
            .iter()
            .find(|r| r.pid == std::process::id())
            .expect("current process listed");
        assert!(me.executable_path.is_some());
        assert!(me.command_line.is_some());
    }

    #[tokio::test]
    async fn test_capture_is_not_empty() {
        let records = Win32Processes::new().capture().await.unwrap();
        assert!(!records.is_empty());
    }
}
