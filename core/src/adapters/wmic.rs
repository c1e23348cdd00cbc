//! Parser for `wmic process get ... /FORMAT:LIST` output.
//!
//! The list format is a sequence of blank-line separated blocks, one per
//! process, each holding `Key=Value` lines. Values may themselves contain
//! `=` and lines usually end in `\r\r\n`.
//!
//! Example:
//! ```text
//! Caption=notepad.exe
//! CommandLine="C:\Windows\notepad.exe" a=b.txt
//! ExecutablePath=C:\Windows\notepad.exe
//! Name=notepad.exe
//! ProcessId=4242
//! ```

#![cfg_attr(not(target_os = "windows"), allow(dead_code))]

use std::collections::HashMap;

use crate::domain::ProcessRecord;

/// Decode raw tool output, which is UTF-16LE when it starts with a BOM.
pub(crate) fn decode_output(bytes: &[u8]) -> String {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Parse all process blocks. Blocks without a numeric `ProcessId` or a
/// `Name` are skipped.
pub(crate) fn parse_process_list(output: &str) -> Vec<ProcessRecord> {
    let mut records = Vec::new();
    let mut block: HashMap<&str, &str> = HashMap::new();

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if let Some(record) = record_from_block(&block) {
                records.push(record);
            }
            block.clear();
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            block.insert(key.trim(), value.trim());
        }
    }
    if let Some(record) = record_from_block(&block) {
        records.push(record);
    }

    records
}

fn record_from_block(block: &HashMap<&str, &str>) -> Option<ProcessRecord> {
    let pid: u32 = block.get("ProcessId")?.parse().ok()?;
    let name = block.get("Name").filter(|n| !n.is_empty())?;
    let caption = block
        .get("Caption")
        .filter(|c| !c.is_empty())
        .unwrap_or(name);

    Some(
        ProcessRecord::new(pid, *name)
            .with_caption(*caption)
            .with_executable_path(block.get("ExecutablePath").copied())
            .with_command_line(block.get("CommandLine").copied()),
    )
}
