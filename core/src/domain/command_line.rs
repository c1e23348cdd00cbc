//! Splitting and joining captured command lines.
//!
//! Windows hands a process its command line as one string and every program
//! parses it itself; the rules here follow `CommandLineToArgvW`. Linux keeps
//! the argument vector, which the adapter captures as a shell-quoted string.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Quoting rules used to split a captured command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandLineSyntax {
    /// `CommandLineToArgvW` rules.
    Windows,
    /// POSIX shell word rules.
    Posix,
}

impl CommandLineSyntax {
    /// Syntax of command lines captured on the current platform.
    pub fn native() -> Self {
        if cfg!(windows) {
            CommandLineSyntax::Windows
        } else {
            CommandLineSyntax::Posix
        }
    }

    /// Split a command line into an argument vector.
    pub fn split(&self, command_line: &str) -> Result<Vec<String>> {
        match self {
            CommandLineSyntax::Windows => split_windows_native(command_line),
            CommandLineSyntax::Posix => shell_words::split(command_line)
                .map_err(|e| Error::MalformedCommandLine(format!("{}: {}", e, command_line))),
        }
    }

    /// Join an argument vector into one command line string.
    pub fn join<S: AsRef<str>>(&self, args: &[S]) -> String {
        match self {
            CommandLineSyntax::Windows => args
                .iter()
                .map(|a| quote_windows_arg(a.as_ref()))
                .collect::<Vec<_>>()
                .join(" "),
            CommandLineSyntax::Posix => shell_words::join(args.iter().map(AsRef::as_ref)),
        }
    }
}

/// Split with the shell's own `CommandLineToArgvW`.
#[cfg(windows)]
fn split_windows_native(command_line: &str) -> Result<Vec<String>> {
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{LocalFree, HLOCAL};
    use windows::Win32::UI::Shell::CommandLineToArgvW;

    // An empty line makes CommandLineToArgvW report the calling executable.
    if command_line.is_empty() {
        return Ok(Vec::new());
    }

    let wide: Vec<u16> = command_line
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();
    let mut count = 0i32;

    unsafe {
        let argv = CommandLineToArgvW(PCWSTR(wide.as_ptr()), &mut count);
        if argv.is_null() {
            return Err(Error::MalformedCommandLine(format!(
                "{}: {}",
                windows::core::Error::from_win32(),
                command_line
            )));
        }

        let args = std::slice::from_raw_parts(argv, usize::try_from(count).unwrap_or(0))
            .iter()
            .map(|arg| String::from_utf16_lossy(arg.as_wide()))
            .collect();
        let _ = LocalFree(HLOCAL(argv.cast()));
        Ok(args)
    }
}

#[cfg(not(windows))]
fn split_windows_native(command_line: &str) -> Result<Vec<String>> {
    Ok(split_windows(command_line))
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Split a command line the way `CommandLineToArgvW` does.
///
/// Argument zero is the program name: it ends at the next quote when it
/// starts with one, else at the first blank, and backslashes are literal.
/// A line starting with blanks therefore yields an empty argument zero.
pub fn split_windows(command_line: &str) -> Vec<String> {
    let chars: Vec<char> = command_line.chars().collect();
    let len = chars.len();
    if len == 0 {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut i = 0;

    let mut program = String::new();
    if chars[0] == '"' {
        i = 1;
        while i < len && chars[i] != '"' {
            program.push(chars[i]);
            i += 1;
        }
        if i < len {
            i += 1;
        }
    } else {
        while i < len && !is_blank(chars[i]) {
            program.push(chars[i]);
            i += 1;
        }
    }
    args.push(program);

    loop {
        while i < len && is_blank(chars[i]) {
            i += 1;
        }
        if i >= len {
            break;
        }

        let mut arg = String::new();
        // Quotes seen in the current run; nonzero means inside quotes.
        let mut quotes = 0u8;

        while i < len {
            let c = chars[i];

            if is_blank(c) && quotes == 0 {
                break;
            }

            if c == '\\' {
                let run = chars[i..].iter().take_while(|&&ch| ch == '\\').count();
                let next = i + run;
                if next < len && chars[next] == '"' {
                    // 2n backslashes + quote: n backslashes, quote is special.
                    // 2n+1 backslashes + quote: n backslashes and a literal quote.
                    arg.extend(std::iter::repeat('\\').take(run / 2));
                    if run % 2 == 1 {
                        arg.push('"');
                        i = next + 1;
                    } else {
                        i = next;
                    }
                } else {
                    arg.extend(std::iter::repeat('\\').take(run));
                    i = next;
                }
                continue;
            }

            if c == '"' {
                // Every third consecutive quote is a literal one. A run
                // ending on an even count leaves quoted mode.
                quotes += 1;
                i += 1;
                while i < len && chars[i] == '"' {
                    quotes += 1;
                    if quotes == 3 {
                        arg.push('"');
                        quotes = 0;
                    }
                    i += 1;
                }
                if quotes == 2 {
                    quotes = 0;
                }
                continue;
            }

            arg.push(c);
            i += 1;
        }

        args.push(arg);
    }

    args
}

/// Quote one argument so that [`split_windows`] returns it unchanged.
pub fn quote_windows_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.chars().any(|c| is_blank(c) || c == '"') {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    let mut backslashes = 0;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                quoted.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                quoted.extend(std::iter::repeat('\\').take(backslashes));
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    quoted.extend(std::iter::repeat('\\').take(backslashes * 2));
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_quoted_program_with_spaces() {
        let args = split_windows(r#""C:\Program Files\App\app.exe" --flag "value with space""#);
        assert_eq!(
            args,
            vec![
                r"C:\Program Files\App\app.exe",
                "--flag",
                "value with space"
            ]
        );
    }

    #[test]
    fn test_split_empty_program_token() {
        assert_eq!(split_windows(r#""" --flag"#), vec!["", "--flag"]);
        assert_eq!(split_windows("   --flag"), vec!["", "--flag"]);
    }

    #[test]
    fn test_split_program_backslashes_are_literal() {
        let args = split_windows(r#"C:\tools\x.exe a\\"b c" d\e"#);
        assert_eq!(args, vec![r"C:\tools\x.exe", r#"a\b c"#, r"d\e"]);
    }

    #[test]
    fn test_split_escaped_quotes() {
        let args = split_windows(r#"app.exe a\"b "c""d e\\\"f"#);
        assert_eq!(args, vec!["app.exe", r#"a"b"#, r#"c"d"#, r#"e\"f"#]);
    }

    #[test]
    fn test_split_doubled_quote_inside_quotes_leaves_quoted_mode() {
        assert_eq!(
            split_windows(r#"app.exe "a""b c""#),
            vec!["app.exe", r#"a"b"#, "c"]
        );
        assert_eq!(split_windows(r#"app.exe """a b""#), vec!["app.exe", r#""a"#, "b"]);
        assert_eq!(split_windows(r#"app.exe "" x"#), vec!["app.exe", "", "x"]);
    }

    #[cfg(windows)]
    #[test]
    fn test_split_matches_shell_parser() {
        let lines = [
            r#""C:\Program Files\App\app.exe" --flag "value with space""#,
            r#"app.exe "a""b c""#,
            r#"app.exe """a b""#,
            r#"app.exe a\"b "c""d e\\\"f"#,
            r#"C:\tools\x.exe a\\"b c" d\e"#,
        ];
        for line in lines {
            assert_eq!(
                CommandLineSyntax::Windows.split(line).unwrap(),
                split_windows(line),
                "{}",
                line
            );
        }
    }

    #[test]
    fn test_split_empty_line() {
        assert!(split_windows("").is_empty());
    }

    #[test]
    fn test_quote_windows_arg() {
        assert_eq!(quote_windows_arg("plain"), "plain");
        assert_eq!(quote_windows_arg(""), r#""""#);
        assert_eq!(quote_windows_arg("two words"), r#""two words""#);
        assert_eq!(quote_windows_arg(r"C:\dir with space\"), r#""C:\dir with space\\""#);
    }

    #[test]
    fn test_windows_join_then_split() {
        let args = vec![
            r"C:\Program Files\App\app.exe".to_string(),
            r#"say "hi""#.to_string(),
            r"trailing\".to_string(),
        ];
        let line = CommandLineSyntax::Windows.join(&args);
        assert_eq!(split_windows(&line), args);
    }

    #[test]
    fn test_posix_split() {
        let args = CommandLineSyntax::Posix
            .split("/usr/bin/app --name 'two words' \"x y\"")
            .unwrap();
        assert_eq!(args, vec!["/usr/bin/app", "--name", "two words", "x y"]);
    }

    #[test]
    fn test_posix_unterminated_quote_is_malformed() {
        let err = CommandLineSyntax::Posix.split("app 'open").unwrap_err();
        assert!(matches!(err, Error::MalformedCommandLine(_)));
    }
}
