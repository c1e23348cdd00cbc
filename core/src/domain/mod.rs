//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod action;
mod catalog;
mod command_line;
mod outcome;
mod process;

// Re-export all domain types
pub use action::{ActionKind, KillMode};
pub use catalog::{
    build_catalog, suggest, CapturedData, CatalogEntry, Category, IconRef, Target,
};
pub use command_line::{quote_windows_arg, split_windows, CommandLineSyntax};
pub use outcome::{
    ExecutionReport, KillOutcome, KillPlan, KillReport, RestartOutcome, RestartSkip,
};
pub use process::{
    is_system_placeholder, ProcessRecord, Snapshot, WindowHandle, WindowIndex, WindowRecord,
    IDLE_PID, SYSTEM_PID,
};
