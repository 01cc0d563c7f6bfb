//! Durable profile storage
//!
//! Persists `{profiles, active_profile}` as a single JSON file in the
//! per-user config directory. All writes use atomic temp-file + rename, and
//! the restrictive file permission is re-applied after every write
//! (best-effort — a chmod failure is logged, never fatal). A tokio Mutex
//! serializes writes from concurrent in-process callers; the file itself is
//! last-writer-wins across processes, an accepted risk for a single-user
//! local tool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::profile::{Profile, ProfileUpdate};

/// The sentinel active-profile name used before any profile exists.
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    profiles: HashMap<String, Profile>,
    #[serde(default = "default_active")]
    active_profile: String,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            profiles: HashMap::new(),
            active_profile: default_active(),
        }
    }
}

fn default_active() -> String {
    DEFAULT_PROFILE.to_string()
}

/// File-backed profile store.
///
/// Constructed explicitly and passed down to the service and commands —
/// never a process-wide instance.
pub struct ProfileStore {
    path: PathBuf,
    state: Mutex<Document>,
}

impl ProfileStore {
    /// Open the store at the per-user default path
    /// (`<config dir>/gads/profiles.json`).
    pub async fn open() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "gads")
            .ok_or_else(|| Error::Io("could not determine a per-user config directory".into()))?;
        Self::load(dirs.config_dir().join("profiles.json")).await
    }

    /// Load the store from the given file path.
    ///
    /// If the file doesn't exist, creates it with an empty profile map and
    /// the sentinel active profile, so future loads skip the cold-start
    /// path.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading profile file: {e}")))?;
            let document: Document = serde_json::from_str(&contents)
                .map_err(|e| Error::Parse(format!("parsing profile file: {e}")))?;
            info!(path = %path.display(), profiles = document.profiles.len(), "loaded profiles");
            document
        } else {
            info!(path = %path.display(), "profile file not found, starting empty");
            let document = Document::default();
            write_atomic(&path, &document).await?;
            document
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve an optional profile name: explicit name if given, else the
    /// currently active profile.
    pub async fn resolve(&self, name: Option<&str>) -> String {
        match name {
            Some(name) => name.to_string(),
            None => self.state.lock().await.active_profile.clone(),
        }
    }

    /// Get a clone of a profile; `None` resolves to the active profile.
    /// A missing profile is absent, not an error.
    pub async fn get(&self, name: Option<&str>) -> Option<Profile> {
        let state = self.state.lock().await;
        let name = name.unwrap_or(&state.active_profile);
        state.profiles.get(name).cloned()
    }

    /// Whether a profile with this exact name exists.
    pub async fn has(&self, name: &str) -> bool {
        self.state.lock().await.profiles.contains_key(name)
    }

    /// Insert or fully replace a profile and persist.
    pub async fn set(&self, name: &str, profile: Profile) -> Result<()> {
        let mut state = self.state.lock().await;
        state.profiles.insert(name.to_string(), profile);
        debug!(profile = name, "stored profile");
        write_atomic(&self.path, &state).await
    }

    /// Shallow-merge fields into an existing profile and persist.
    ///
    /// Returns the merged profile. Fails with `ProfileNotFound` when the
    /// profile does not exist.
    pub async fn update(&self, name: &str, update: ProfileUpdate) -> Result<Profile> {
        let mut state = self.state.lock().await;
        let profile = state
            .profiles
            .get_mut(name)
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))?;
        update.apply(profile);
        let merged = profile.clone();
        debug!(profile = name, "updated profile");
        write_atomic(&self.path, &state).await?;
        Ok(merged)
    }

    /// Remove a profile and persist. Fails with `ProfileNotFound` when the
    /// profile does not exist; the file is left untouched in that case.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.profiles.remove(name).is_none() {
            return Err(Error::ProfileNotFound(name.to_string()));
        }
        debug!(profile = name, "deleted profile");
        write_atomic(&self.path, &state).await
    }

    /// The currently active profile name. May be the sentinel default,
    /// which need not reference an existing profile yet.
    pub async fn active(&self) -> String {
        self.state.lock().await.active_profile.clone()
    }

    /// Switch the active profile. The target must exist.
    pub async fn set_active(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.profiles.contains_key(name) {
            return Err(Error::ProfileNotFound(name.to_string()));
        }
        state.active_profile = name.to_string();
        debug!(profile = name, "switched active profile");
        write_atomic(&self.path, &state).await
    }

    /// All profile names. Order is not significant.
    pub async fn list(&self) -> Vec<String> {
        self.state.lock().await.profiles.keys().cloned().collect()
    }
}

/// Write the profile document to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target, so a crash mid-write cannot corrupt the store. The 0600
/// permission is applied to the temp file and carried through the rename;
/// a permission failure is logged and swallowed.
async fn write_atomic(path: &Path, document: &Document) -> Result<()> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|e| Error::Parse(format!("serializing profiles: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("profile path has no parent directory".into()))?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::Io(format!("creating profile directory: {e}")))?;

    let tmp_path = dir.join(format!(".profiles.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp profile file: {e}")))?;

    restrict_permissions(&tmp_path).await;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp profile file: {e}")))?;

    debug!(path = %path.display(), "persisted profiles");
    Ok(())
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o600);
    if let Err(err) = tokio::fs::set_permissions(path, perms).await {
        warn!(path = %path.display(), %err, "could not restrict profile file permissions");
    }
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::test_profile;
    use common::Secret;

    #[tokio::test]
    async fn roundtrip_set_get() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");

        let store = ProfileStore::load(path.clone()).await.unwrap();
        let mut profile = test_profile("acme");
        profile.login_customer_id = Some("9876543210".into());
        store.set("acme", profile.clone()).await.unwrap();

        // Load into a new store instance to cover persistence
        let store2 = ProfileStore::load(path).await.unwrap();
        let loaded = store2.get(Some("acme")).await.unwrap();
        assert_eq!(loaded, profile);
    }

    #[tokio::test]
    async fn cold_start_creates_empty_file_with_sentinel_active() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");

        assert!(!path.exists());
        let store = ProfileStore::load(path.clone()).await.unwrap();
        assert!(path.exists());
        assert!(store.list().await.is_empty());
        assert_eq!(store.active().await, DEFAULT_PROFILE);

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["active_profile"], "default");
    }

    #[tokio::test]
    async fn get_without_name_resolves_active() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::load(dir.path().join("profiles.json"))
            .await
            .unwrap();

        // Sentinel active profile does not exist yet
        assert!(store.get(None).await.is_none());

        store.set("default", test_profile("d")).await.unwrap();
        store.set("acme", test_profile("a")).await.unwrap();
        assert_eq!(
            store.get(None).await.unwrap().client_id,
            "client-d.apps.googleusercontent.com"
        );

        store.set_active("acme").await.unwrap();
        assert_eq!(
            store.get(None).await.unwrap().client_id,
            "client-a.apps.googleusercontent.com"
        );
    }

    #[tokio::test]
    async fn update_merges_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        let store = ProfileStore::load(path.clone()).await.unwrap();
        store.set("acme", test_profile("acme")).await.unwrap();

        let merged = store
            .update(
                "acme",
                ProfileUpdate {
                    access_token: Some(Secret::new("at_1".into())),
                    refresh_token: Some(Secret::new("rt_1".into())),
                    token_expiry: Some(Some(1_700_000_000_000)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(merged.is_authenticated());
        assert_eq!(merged.customer_id, "1234567890");

        let store2 = ProfileStore::load(path).await.unwrap();
        let loaded = store2.get(Some("acme")).await.unwrap();
        assert_eq!(loaded.token_expiry, Some(1_700_000_000_000));
        assert_eq!(loaded.access_token, Some(Secret::new("at_1".into())));
    }

    #[tokio::test]
    async fn update_nonexistent_profile_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::load(dir.path().join("profiles.json"))
            .await
            .unwrap();

        let result = store.update("ghost", ProfileUpdate::default()).await;
        assert!(matches!(result, Err(Error::ProfileNotFound(name)) if name == "ghost"));
    }

    #[tokio::test]
    async fn delete_nonexistent_profile_errors_and_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        let store = ProfileStore::load(path.clone()).await.unwrap();
        store.set("acme", test_profile("acme")).await.unwrap();
        let before = tokio::fs::read_to_string(&path).await.unwrap();

        let result = store.delete("ghost").await;
        assert!(matches!(result, Err(Error::ProfileNotFound(_))));

        let after = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(before, after, "failed delete must not rewrite the file");
        assert!(store.has("acme").await);
    }

    #[tokio::test]
    async fn delete_removes_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::load(dir.path().join("profiles.json"))
            .await
            .unwrap();
        store.set("acme", test_profile("acme")).await.unwrap();

        store.delete("acme").await.unwrap();
        assert!(!store.has("acme").await);
        assert!(store.get(Some("acme")).await.is_none());
    }

    #[tokio::test]
    async fn set_active_requires_existing_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::load(dir.path().join("profiles.json"))
            .await
            .unwrap();

        let result = store.set_active("ghost").await;
        assert!(matches!(result, Err(Error::ProfileNotFound(_))));

        store.set("acme", test_profile("acme")).await.unwrap();
        store.set_active("acme").await.unwrap();
        assert_eq!(store.active().await, "acme");
    }

    #[tokio::test]
    async fn list_returns_all_profile_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::load(dir.path().join("profiles.json"))
            .await
            .unwrap();
        store.set("b-profile", test_profile("b")).await.unwrap();
        store.set("a-profile", test_profile("a")).await.unwrap();

        let mut names = store.list().await;
        names.sort();
        assert_eq!(names, vec!["a-profile", "b-profile"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        let store = ProfileStore::load(path.clone()).await.unwrap();
        store.set("acme", test_profile("acme")).await.unwrap();

        let metadata = tokio::fs::metadata(&path).await.unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "profile file must be 0600, got {mode:o}");
    }

    #[tokio::test]
    async fn concurrent_writes_dont_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        let store = std::sync::Arc::new(ProfileStore::load(path.clone()).await.unwrap());

        let mut handles = vec![];
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .set(&format!("profile-{i}"), test_profile(&i.to_string()))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.list().await.len(), 10);

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["profiles"].as_object().unwrap().len(), 10);
    }
}
