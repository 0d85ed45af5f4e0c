use thiserror::Error;

/// Central error type for the entire launcher core.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── Local, pre-flight ───────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No instance selected")]
    NoInstanceSelected,

    #[error("Not authenticated")]
    NotAuthenticated,

    // ── Backend ─────────────────────────────────────────
    /// Backend rejected a store request. The message is passed through
    /// verbatim, never reinterpreted.
    #[error("{0}")]
    Backend(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    // ── Launch sequence ─────────────────────────────────
    #[error("Manifest acquisition failed: {0}")]
    Manifest(String),

    #[error("Launch failed: {0}")]
    Launch(String),

    #[error("Termination failed: {0}")]
    Terminate(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

// ── Serialization for presentation IPC ──────────────────
// The shell surfaces errors as human-readable strings.
impl serde::Serialize for LauncherError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
