// ─── Launch State Machine ───
// Sequences a launch attempt from idle to a running game process, with
// at-most-one-in-flight semantics.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::{LauncherError, LauncherResult};
use crate::instance::Instance;

/// Current node of the launch sequence, in the frontend's wire spelling.
///
/// `Idle` and `Active` are the only rest states; `Initialize` and `Launch`
/// exist to make backend suspension windows observable and to block
/// re-entry while an attempt is in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunchState {
    Idle,
    Initialize,
    Launch,
    Active,
}

impl std::fmt::Display for LaunchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchState::Idle => write!(f, "IDLE"),
            LaunchState::Initialize => write!(f, "INITIALIZE"),
            LaunchState::Launch => write!(f, "LAUNCH"),
            LaunchState::Active => write!(f, "ACTIVE"),
        }
    }
}

/// Drives the strict linear sequence `Idle → Initialize → Launch → Active`
/// and back. Failure during a transient state reverts to `Idle`; a launch
/// request outside `Idle` is ignored rather than queued.
pub struct LaunchMachine {
    backend: Arc<dyn Backend>,
    state: watch::Sender<LaunchState>,
}

impl LaunchMachine {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (state, _) = watch::channel(LaunchState::Idle);
        Self { backend, state }
    }

    pub fn state(&self) -> LaunchState {
        *self.state.borrow()
    }

    /// Observe state changes, including the transient ones published at
    /// backend suspension points.
    pub fn subscribe(&self) -> watch::Receiver<LaunchState> {
        self.state.subscribe()
    }

    fn set_state(&self, next: LaunchState) {
        debug!("Launch state -> {next}");
        self.state.send_replace(next);
    }

    /// Run one full launch attempt for `instance` with the given memory
    /// budget.
    ///
    /// No-op unless the machine is at rest in `Idle`; there is never more
    /// than one attempt in flight. The environment check is advisory only,
    /// manifest acquisition is fatal, and the `Active` transition happens
    /// optimistically before the backend launch call — a failed call rolls
    /// the state back to `Idle`.
    pub async fn launch(&self, instance: Option<&Instance>, ram: &str) -> LauncherResult<()> {
        if self.state() != LaunchState::Idle {
            debug!("Ignoring launch request while {}", self.state());
            return Ok(());
        }
        self.set_state(LaunchState::Initialize);

        info!("Checking dependencies...");
        match self.backend.check_environment().await {
            Ok(true) => {}
            Ok(false) => warn!("Game directory not found or unreachable"),
            Err(err) => warn!("Environment check failed: {err}"),
        }

        info!("Downloading version manifest...");
        if let Err(err) = self.backend.acquire_manifest().await {
            self.set_state(LaunchState::Idle);
            return Err(err);
        }
        self.set_state(LaunchState::Launch);

        let Some(instance) = instance else {
            self.set_state(LaunchState::Idle);
            return Err(LauncherError::NoInstanceSelected);
        };

        // Observers see the committed attempt immediately; the backend
        // call below decides whether it sticks.
        self.set_state(LaunchState::Active);
        info!(
            "Starting launch sequence for {} with {ram}...",
            instance.version
        );
        if let Err(err) = self.backend.launch(&instance.version, ram).await {
            self.set_state(LaunchState::Idle);
            return Err(err);
        }

        Ok(())
    }

    /// Best-effort termination of the running process. Only meaningful
    /// from `Active`; the transition back to `Idle` happens regardless of
    /// whether the backend kill succeeds. Actual process death is
    /// confirmed out of band through the event stream.
    pub async fn kill(&self) -> LauncherResult<()> {
        if self.state() != LaunchState::Active {
            debug!("Ignoring kill request while {}", self.state());
            return Ok(());
        }

        if let Err(err) = self.backend.terminate().await {
            warn!("Terminate request failed: {err}");
        }
        info!("Process terminated by user");
        self.set_state(LaunchState::Idle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::instance::LoaderType;

    fn machine() -> (LaunchMachine, Arc<MockBackend>) {
        let backend = Arc::new(MockBackend::new());
        let machine = LaunchMachine::new(Arc::clone(&backend) as Arc<dyn Backend>);
        (machine, backend)
    }

    fn some_instance() -> Instance {
        Instance::new(
            "Survival World".into(),
            "survival-world".into(),
            "1.21.11".into(),
            LoaderType::Vanilla,
        )
    }

    #[tokio::test]
    async fn happy_path_runs_phases_in_order() {
        let (machine, backend) = machine();
        let inst = some_instance();

        machine.launch(Some(&inst), "4G").await.unwrap();

        assert_eq!(machine.state(), LaunchState::Active);
        assert_eq!(
            backend.calls(),
            vec![
                "check_environment".to_string(),
                "acquire_manifest".to_string(),
                "launch 1.21.11 4G".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn soft_environment_failure_does_not_abort() {
        let (machine, backend) = machine();
        *backend.environment_ok.lock().unwrap() = false;
        let inst = some_instance();

        machine.launch(Some(&inst), "2G").await.unwrap();

        assert_eq!(machine.state(), LaunchState::Active);
        assert!(backend.calls().iter().any(|c| c.starts_with("launch")));
    }

    #[tokio::test]
    async fn manifest_failure_is_fatal_and_reverts_to_idle() {
        let (machine, backend) = machine();
        *backend.fail_manifest.lock().unwrap() = Some("manifest unreachable".into());
        let inst = some_instance();

        let err = machine.launch(Some(&inst), "4G").await.unwrap_err();

        assert!(matches!(err, LauncherError::Manifest(_)));
        assert_eq!(machine.state(), LaunchState::Idle);
        assert!(!backend.calls().iter().any(|c| c.starts_with("launch")));
    }

    #[tokio::test]
    async fn missing_instance_fails_locally_without_launch_call() {
        let (machine, backend) = machine();

        let err = machine.launch(None, "4G").await.unwrap_err();

        assert!(matches!(err, LauncherError::NoInstanceSelected));
        assert_eq!(machine.state(), LaunchState::Idle);
        assert!(!backend.calls().iter().any(|c| c.starts_with("launch")));
    }

    #[tokio::test]
    async fn failed_backend_launch_rolls_back_optimistic_active() {
        let (machine, backend) = machine();
        *backend.fail_launch.lock().unwrap() = Some("java not found".into());
        let inst = some_instance();

        let mut states = machine.subscribe();
        let err = machine.launch(Some(&inst), "4G").await.unwrap_err();

        assert!(matches!(err, LauncherError::Launch(_)));
        assert_eq!(machine.state(), LaunchState::Idle);
        // The optimistic transition was published, then rolled back.
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), LaunchState::Idle);
    }

    #[tokio::test]
    async fn second_request_while_active_is_ignored() {
        let (machine, backend) = machine();
        let inst = some_instance();
        machine.launch(Some(&inst), "4G").await.unwrap();
        let calls_before = backend.calls().len();

        machine.launch(Some(&inst), "4G").await.unwrap();

        assert_eq!(backend.calls().len(), calls_before);
        assert_eq!(machine.state(), LaunchState::Active);
    }

    #[tokio::test]
    async fn second_request_during_initialize_is_ignored() {
        let (machine, backend) = machine();
        let gate = Arc::new(tokio::sync::Notify::new());
        *backend.manifest_gate.lock().unwrap() = Some(Arc::clone(&gate));
        let inst = some_instance();

        // First attempt parks inside acquire_manifest; the second request
        // arrives while the machine is still in Initialize.
        let first = machine.launch(Some(&inst), "4G");
        let second = async {
            assert_eq!(machine.state(), LaunchState::Initialize);
            machine.launch(Some(&inst), "4G").await.unwrap();
            assert_eq!(machine.state(), LaunchState::Initialize);
            gate.notify_one();
        };
        let (result, ()) = tokio::join!(first, second);
        result.unwrap();

        assert_eq!(machine.state(), LaunchState::Active);
        let calls = backend.calls();
        assert_eq!(
            calls.iter().filter(|c| *c == "check_environment").count(),
            1
        );
        assert_eq!(
            calls.iter().filter(|c| *c == "acquire_manifest").count(),
            1
        );
        assert_eq!(calls.iter().filter(|c| c.starts_with("launch")).count(), 1);
    }

    #[tokio::test]
    async fn kill_outside_active_is_a_no_op() {
        let (machine, backend) = machine();

        machine.kill().await.unwrap();

        assert_eq!(machine.state(), LaunchState::Idle);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn kill_transitions_to_idle_even_if_terminate_fails() {
        let (machine, backend) = machine();
        *backend.fail_terminate.lock().unwrap() = Some("process already gone".into());
        let inst = some_instance();
        machine.launch(Some(&inst), "4G").await.unwrap();

        machine.kill().await.unwrap();

        assert_eq!(machine.state(), LaunchState::Idle);
        assert!(backend.calls().iter().any(|c| c == "terminate"));
    }

    #[tokio::test]
    async fn relaunch_after_kill_is_allowed() {
        let (machine, backend) = machine();
        let inst = some_instance();
        machine.launch(Some(&inst), "4G").await.unwrap();
        machine.kill().await.unwrap();

        machine.launch(Some(&inst), "8G").await.unwrap();

        assert_eq!(machine.state(), LaunchState::Active);
        assert_eq!(
            backend
                .calls()
                .iter()
                .filter(|c| c.starts_with("launch"))
                .count(),
            2
        );
    }
}
