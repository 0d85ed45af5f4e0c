// ─── Backend Boundary ───
// The privileged process that owns persistence, downloading, authentication
// and the game process is reached only through this trait. The core never
// assumes anything about how these operations are carried out.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::LauncherResult;
use crate::instance::Instance;

/// One free-text log/status line emitted by the backend while a game runs.
pub type EventLine = String;

/// RPC-style contract the orchestration core requires from the backend.
///
/// All fallible calls suspend the caller until the backend replies. Error
/// messages coming back through [`crate::error::LauncherError::Backend`]
/// are surfaced to the user verbatim.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Run the backend's authentication flow, returning the player name.
    async fn authenticate(&self) -> LauncherResult<String>;

    /// Fetch the full, authoritative instance list.
    async fn list_instances(&self) -> LauncherResult<Vec<Instance>>;

    /// Persist a freshly created instance. Rejects duplicate slugs.
    async fn create_instance(&self, instance: Instance) -> LauncherResult<()>;

    /// Remove the instance stored under `slug`, including its on-disk state.
    async fn delete_instance(&self, slug: &str) -> LauncherResult<()>;

    /// Replace the stored record matching `instance.id`.
    async fn update_instance(&self, instance: Instance) -> LauncherResult<()>;

    /// List game versions already present on disk.
    async fn scan_installed_versions(&self) -> LauncherResult<Vec<String>>;

    /// Soft environment probe (e.g. presence of the runtime directory).
    /// A `false` here is advisory only.
    async fn check_environment(&self) -> LauncherResult<bool>;

    /// Download/refresh the version manifest. Fatal to a launch attempt
    /// when it fails.
    async fn acquire_manifest(&self) -> LauncherResult<()>;

    /// Spawn the game process for `version` with the given memory budget.
    async fn launch(&self, version: &str, ram: &str) -> LauncherResult<()>;

    /// Best-effort kill of the running game process.
    async fn terminate(&self) -> LauncherResult<()>;

    /// Open the long-lived log line stream. Called once per session.
    fn subscribe_events(&self) -> mpsc::UnboundedReceiver<EventLine>;
}
