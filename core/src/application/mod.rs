//! Application layer - Use case services.
//!
//! This module contains application services that orchestrate
//! domain logic and adapter interactions.
//!
//! Services are designed to be thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs

mod resolver;
mod restart;
mod snapshot_service;
mod termination;

#[cfg(test)]
pub(crate) mod testing;

pub use resolver::TargetResolver;
pub use restart::RestartPlanner;
pub use snapshot_service::SnapshotService;
pub use termination::{
    TerminationEngine, TerminationOptions, DEFAULT_GRACEFUL_TIMEOUT_MS,
    DEFAULT_RESTART_WAIT_TIMEOUT_MS,
};
