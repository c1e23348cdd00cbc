//! `ShellExecuteW` launching, including the `runas` elevation verb.

use tracing::debug;
use windows::core::{HSTRING, PCWSTR};
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Shell::ShellExecuteW;
use windows::Win32::UI::WindowsAndMessaging::{SHOW_WINDOW_CMD, SW_HIDE, SW_SHOWNORMAL};

use crate::domain::quote_windows_arg;
use crate::error::{Error, Result};
use crate::ports::{ElevatedKill, LauncherPort};

/// Starts programs through the shell.
#[derive(Debug, Default)]
pub struct Win32Launcher;

impl Win32Launcher {
    pub fn new() -> Self {
        Self
    }

    async fn shell_execute(verb: &str, file: &str, parameters: String, show: SHOW_WINDOW_CMD) -> Result<()> {
        let (verb, file) = (verb.to_string(), file.to_string());
        let description = format!("{} {} {}", verb, file, parameters);

        let code = tokio::task::spawn_blocking(move || {
            let verb = HSTRING::from(verb);
            let file = HSTRING::from(file);
            let parameters = HSTRING::from(parameters);
            // SAFETY: all strings are NUL-terminated and outlive the call.
            let instance = unsafe {
                ShellExecuteW(
                    HWND::default(),
                    PCWSTR(verb.as_ptr()),
                    PCWSTR(file.as_ptr()),
                    PCWSTR(parameters.as_ptr()),
                    PCWSTR::null(),
                    show,
                )
            };
            instance.0 as isize
        })
        .await
        .map_err(|e| Error::Launch(format!("{}: {}", description, e)))?;

        // Values above 32 indicate success.
        if code <= 32 {
            return Err(Error::Launch(format!(
                "{}: ShellExecuteW returned {}",
                description, code
            )));
        }
        debug!(command = %description, "Shell execute succeeded");
        Ok(())
    }
}

/// `taskkill` parameters for an elevated forced kill.
fn taskkill_parameters(request: &ElevatedKill) -> String {
    match request {
        ElevatedKill::ByName(name) => format!("/F /IM {}", quote_windows_arg(name)),
        ElevatedKill::ById(pid) => format!("/F /PID {}", pid),
    }
}

impl LauncherPort for Win32Launcher {
    async fn launch(&self, program: &str, args: &[String]) -> Result<()> {
        let parameters = args
            .iter()
            .map(|a| quote_windows_arg(a))
            .collect::<Vec<_>>()
            .join(" ");
        Self::shell_execute("open", program, parameters, SW_SHOWNORMAL).await
    }

    async fn launch_elevated(&self, request: &ElevatedKill) -> Result<()> {
        Self::shell_execute("runas", "taskkill", taskkill_parameters(request), SW_HIDE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taskkill_parameters() {
        assert_eq!(taskkill_parameters(&ElevatedKill::ById(42)), "/F /PID 42");
        assert_eq!(
            taskkill_parameters(&ElevatedKill::ByName("my app.exe".into())),
            r#"/F /IM "my app.exe""#
        );
    }
}
