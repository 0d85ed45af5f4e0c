// ─── Launcher Session ───
// Composition root consumed by the presentation shell. Holds no business
// logic of its own; every action delegates to the store or the machine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::error::{LauncherError, LauncherResult};
use crate::events::EventIntake;
use crate::instance::{slugify, Instance, InstanceStore, LoaderType};
use crate::launch::{LaunchMachine, LaunchState};

/// User-chosen memory budget for the game process.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum RamAllocation {
    #[serde(rename = "2G")]
    TwoGb,
    #[default]
    #[serde(rename = "4G")]
    FourGb,
    #[serde(rename = "8G")]
    EightGb,
}

impl RamAllocation {
    /// The `-Xmx`-style argument string the backend expects.
    pub fn as_arg(&self) -> &'static str {
        match self {
            RamAllocation::TwoGb => "2G",
            RamAllocation::FourGb => "4G",
            RamAllocation::EightGb => "8G",
        }
    }
}

impl std::fmt::Display for RamAllocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_arg())
    }
}

/// Read-only view of the session for the presentation layer, in the
/// frontend's wire shape.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: LaunchState,
    pub instances: Vec<Instance>,
    pub selected_instance_id: Option<String>,
    pub player_name: Option<String>,
    pub ram: RamAllocation,
    pub installed_versions: Vec<String>,
}

/// One launcher session: constructed on app start, torn down on app close.
///
/// Owns the instance cache, the launch state machine, the event intake and
/// the transient session fields (selection lives in the store, memory
/// budget and player identity here). The one cross-cutting rule enforced
/// at this level: instance-affecting actions are gated until a player
/// identity exists.
pub struct LauncherSession {
    backend: Arc<dyn Backend>,
    store: InstanceStore,
    machine: LaunchMachine,
    events: EventIntake,
    ram: RamAllocation,
    player: Option<String>,
    installed_versions: Vec<String>,
}

impl LauncherSession {
    /// Build the session and open the long-lived event subscription.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let events = EventIntake::subscribe(backend.as_ref());
        Self {
            store: InstanceStore::new(Arc::clone(&backend)),
            machine: LaunchMachine::new(Arc::clone(&backend)),
            events,
            backend,
            ram: RamAllocation::default(),
            player: None,
            installed_versions: Vec::new(),
        }
    }

    /// Startup sync: mirror the backend's instance list and scan for
    /// already-installed game versions. A failed scan only costs the
    /// version picker its suggestions, so it is logged and swallowed.
    pub async fn init(&mut self) -> LauncherResult<()> {
        self.store.refresh().await?;
        match self.backend.scan_installed_versions().await {
            Ok(versions) => self.installed_versions = versions,
            Err(err) => warn!("Installed version scan failed: {err}"),
        }
        Ok(())
    }

    // ── Authentication gate ─────────────────────────────

    pub async fn authenticate(&mut self) -> LauncherResult<()> {
        let name = self.backend.authenticate().await?;
        info!("Logged in successfully: {name}");
        self.player = Some(name);
        Ok(())
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player.as_deref()
    }

    fn require_player(&self) -> LauncherResult<()> {
        if self.player.is_none() {
            return Err(LauncherError::NotAuthenticated);
        }
        Ok(())
    }

    // ── Instance actions ────────────────────────────────

    pub async fn refresh_instances(&mut self) -> LauncherResult<()> {
        self.store.refresh().await
    }

    /// Create an instance named `name`, deriving its permanent storage
    /// slug from the name once, here.
    pub async fn create_instance(
        &mut self,
        name: &str,
        version: &str,
        loader: LoaderType,
    ) -> LauncherResult<()> {
        self.require_player()?;
        let slug = slugify(name);
        self.store
            .create(name.to_string(), slug, version.to_string(), loader)
            .await
    }

    pub async fn delete_instance(&mut self, slug: &str) -> LauncherResult<()> {
        self.require_player()?;
        self.store.delete(slug).await
    }

    pub async fn update_instance(&mut self, instance: Instance) -> LauncherResult<()> {
        self.require_player()?;
        self.store.update(instance).await
    }

    pub fn select_instance(&mut self, id: &str) -> LauncherResult<()> {
        self.require_player()?;
        self.store.select(id);
        Ok(())
    }

    pub fn instances(&self) -> &[Instance] {
        self.store.instances()
    }

    pub fn selected_instance(&self) -> Option<&Instance> {
        self.store.selected_instance()
    }

    pub fn selected_instance_id(&self) -> Option<&str> {
        self.store.selected_id()
    }

    pub fn installed_versions(&self) -> &[String] {
        &self.installed_versions
    }

    // ── Launch actions ──────────────────────────────────

    pub async fn launch(&self) -> LauncherResult<()> {
        self.require_player()?;
        self.machine
            .launch(self.store.selected_instance(), self.ram.as_arg())
            .await
    }

    pub async fn kill(&self) -> LauncherResult<()> {
        self.machine.kill().await
    }

    pub fn state(&self) -> LaunchState {
        self.machine.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<LaunchState> {
        self.machine.subscribe()
    }

    pub fn set_ram(&mut self, ram: RamAllocation) {
        self.ram = ram;
    }

    pub fn ram(&self) -> RamAllocation {
        self.ram
    }

    // ── Events & teardown ───────────────────────────────

    pub fn events(&mut self) -> &mut EventIntake {
        &mut self.events
    }

    /// End-of-session teardown. Idempotent; also implied by drop.
    pub fn close(&mut self) {
        self.events.close();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            instances: self.store.instances().to_vec(),
            selected_instance_id: self.store.selected_id().map(str::to_string),
            player_name: self.player.clone(),
            ram: self.ram,
            installed_versions: self.installed_versions.clone(),
        }
    }
}
