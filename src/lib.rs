//! Vesper launcher orchestration core.
//!
//! Tracks the catalog of user-defined instances, drives the launch state
//! machine and relays the running game's log stream. The privileged
//! backend (persistence, downloads, authentication, process control) sits
//! behind the [`Backend`] trait; the presentation shell consumes
//! [`LauncherSession`] and performs no orchestration of its own.

pub mod backend;
pub mod error;
pub mod events;
pub mod instance;
pub mod launch;
pub mod session;

pub use backend::Backend;
pub use error::{LauncherError, LauncherResult};
pub use events::EventIntake;
pub use instance::{slugify, Instance, InstanceStore, LoaderType};
pub use launch::{LaunchMachine, LaunchState};
pub use session::{LauncherSession, RamAllocation, SessionSnapshot};

use tracing_subscriber::EnvFilter;

/// Initialize structured logging for the hosting application.
/// Call once at startup, before constructing a [`LauncherSession`].
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,vesper_core=debug")),
        )
        .init();
}
