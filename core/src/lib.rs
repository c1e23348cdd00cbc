//! TaskReaper Core Library
//!
//! Process lifecycle control for a process-killer launcher:
//! - Snapshot running processes and their switchable windows
//! - Resolve a selected target into the PIDs an action applies to
//! - Terminate with a graceful-then-forceful policy and bounded waits
//! - Relaunch a terminated process from its captured command line
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: Operating system implementations
//! - `application`: Use case services
//! - `controller`: Long-lived state and the host shell contract
//!
//! # Platform Support
//! - Windows: Win32 API, `wmic` when available
//! - Linux: `/proc`, signals and `wmctrl`

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod controller;
pub mod error;
pub mod icons;

// Re-export domain types (primary API)
pub use domain::{
    ActionKind, CatalogEntry, Category, ExecutionReport, KillOutcome, KillReport,
    RestartOutcome, Snapshot, Target,
};

// Re-export other commonly used types
pub use config::{ConfigStore, Settings};
pub use controller::{PlatformController, ProcessController};
pub use error::{Error, Result};
