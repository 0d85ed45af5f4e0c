use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LauncherError, LauncherResult};

/// Supported mod loaders — strongly typed, no magic strings.
///
/// Behaviorally just a tag handed to the backend; only presentation
/// distinguishes them (icon, label).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoaderType {
    Vanilla,
    Fabric,
    NeoForge,
}

impl std::fmt::Display for LoaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderType::Vanilla => write!(f, "Vanilla"),
            LoaderType::Fabric => write!(f, "Fabric"),
            LoaderType::NeoForge => write!(f, "NeoForge"),
        }
    }
}

/// A persisted run configuration. The backend is the system of record;
/// local copies are replaced wholesale on every refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instance {
    /// Unique UUID, assigned at creation, immutable.
    pub id: String,
    pub name: String,
    /// Filesystem-safe key, e.g. "my-survival-world". Derived from `name`
    /// once at creation; the backend stores instance data under it, so
    /// later `name` edits never touch it.
    pub slug: String,
    /// Target game version string (e.g. "1.21.11").
    pub version: String,
    pub loader: LoaderType,
    /// Opaque icon reference (base64 or local path); no local semantics.
    pub icon: Option<String>,
    /// Cumulative seconds, written only by the backend after a run.
    pub time_played: u64,
    /// Unix timestamp of the last successful launch; `None` = never played.
    pub last_played: Option<u64>,
}

impl Instance {
    /// Build a candidate record for a "create" request: fresh id, zeroed
    /// usage fields. Becomes real only once the backend confirms it.
    pub fn new(name: String, slug: String, version: String, loader: LoaderType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            slug,
            version,
            loader,
            icon: None,
            time_played: 0,
            last_played: None,
        }
    }

    /// Local pre-flight check; obviously malformed records never reach
    /// the backend.
    pub fn validate(&self) -> LauncherResult<()> {
        if self.name.trim().is_empty() {
            return Err(LauncherError::Validation("Instance name is empty".into()));
        }
        if self.slug.trim().is_empty() {
            return Err(LauncherError::Validation("Instance slug is empty".into()));
        }
        if self.version.trim().is_empty() {
            return Err(LauncherError::Validation(
                "Instance version is empty".into(),
            ));
        }
        Ok(())
    }

    /// Last successful launch as a UTC timestamp, for presentation.
    pub fn last_played_at(&self) -> Option<DateTime<Utc>> {
        self.last_played
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

/// Derive the filesystem-safe storage key from a user-facing name:
/// lowercase `[a-z0-9]+` tokens joined by `-`, no leading or trailing `-`.
/// Pure and deterministic; an empty result is rejected by validation.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
