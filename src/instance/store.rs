use std::sync::Arc;

use tracing::{info, warn};

use super::model::{Instance, LoaderType};
use crate::backend::Backend;
use crate::error::LauncherResult;

/// In-memory mirror of the backend-held instance list, plus selection
/// bookkeeping.
///
/// The backend is the system of record: the cache never invents instances
/// and is replaced atomically on every [`refresh`](Self::refresh). All
/// mutations go through `&mut self`, which serializes them against any
/// in-flight refresh.
pub struct InstanceStore {
    backend: Arc<dyn Backend>,
    instances: Vec<Instance>,
    /// Weak reference: always resolved against the current cache, never
    /// a direct handle to a record (records are swapped out wholesale).
    selected: Option<String>,
}

impl InstanceStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            instances: Vec::new(),
            selected: None,
        }
    }

    /// Read-only snapshot of the cached list, in backend order.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Resolve the selection against the current cache. A dangling id
    /// resolves to `None`.
    pub fn selected_instance(&self) -> Option<&Instance> {
        let id = self.selected.as_deref()?;
        self.instances.iter().find(|i| i.id == id)
    }

    /// Target `id` for the next launch. Ignored if the id is not in the
    /// cache.
    pub fn select(&mut self, id: &str) {
        if self.instances.iter().any(|i| i.id == id) {
            self.selected = Some(id.to_string());
        } else {
            warn!("Ignoring selection of unknown instance id {id}");
        }
    }

    /// Fetch the full list from the backend and replace the cache
    /// atomically. On failure the previous cache is kept.
    ///
    /// Selection is reconciled afterwards: a selection that no longer
    /// resolves is cleared, and when nothing is selected the first entry
    /// becomes a convenience default.
    pub async fn refresh(&mut self) -> LauncherResult<()> {
        let fetched = self.backend.list_instances().await?;
        self.instances = fetched;

        let still_present = self
            .selected
            .as_deref()
            .is_some_and(|id| self.instances.iter().any(|i| i.id == id));
        if !still_present {
            self.selected = self.instances.first().map(|i| i.id.clone());
        }

        Ok(())
    }

    /// Submit a candidate record to the backend, then refresh and select
    /// the new id. Empty fields are rejected locally before any backend
    /// round-trip.
    pub async fn create(
        &mut self,
        name: String,
        slug: String,
        version: String,
        loader: LoaderType,
    ) -> LauncherResult<()> {
        let candidate = Instance::new(name, slug, version, loader);
        candidate.validate()?;

        let id = candidate.id.clone();
        self.backend.create_instance(candidate.clone()).await?;
        info!("Created instance '{}' ({})", candidate.name, id);

        self.refresh().await?;
        self.select(&id);
        Ok(())
    }

    /// Request removal keyed by `slug`, then refresh. The refresh leaves
    /// selection consistent even when the selected instance was deleted.
    pub async fn delete(&mut self, slug: &str) -> LauncherResult<()> {
        self.backend.delete_instance(slug).await?;
        info!("Deleted instance {slug}");
        self.refresh().await
    }

    /// Submit a full replacement record keyed by `instance.id`, then
    /// refresh.
    pub async fn update(&mut self, instance: Instance) -> LauncherResult<()> {
        instance.validate()?;
        self.backend.update_instance(instance).await?;
        self.refresh().await
    }
}
