use async_trait::async_trait;
use log::{debug, warn};
use priceguard_core::{ProviderId, ProviderSnapshot, UserId};
use priceguard_ports::{SnapshotStore, StoreError};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Current on-disk document version
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    version: u32,
    user: UserId,
    snapshot: ProviderSnapshot,
}

/// Snapshot store keeping one JSON document per pair
///
/// Layout: `<root>/<provider>/<user>.json`. A write goes to a uniquely named
/// temporary file in the same directory and is then renamed over the target,
/// so readers see either the old or the new document, never a partial one.
#[derive(Debug, Clone)]
pub struct JsonDirSnapshotStore {
    root: PathBuf,
}

impl JsonDirSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, user: UserId, provider: ProviderId) -> PathBuf {
        self.root
            .join(provider.as_str())
            .join(format!("{}.json", user))
    }
}

fn unavailable(action: &str, path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("{} {}: {}", action, path.display(), err))
}

#[async_trait]
impl SnapshotStore for JsonDirSnapshotStore {
    async fn get(
        &self,
        user: UserId,
        provider: ProviderId,
    ) -> Result<Option<ProviderSnapshot>, StoreError> {
        let path = self.path_for(user, provider);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unavailable("reading", &path, e)),
        };

        let stored: StoredSnapshot = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?;
        if stored.version != FORMAT_VERSION {
            return Err(StoreError::Corrupt(format!(
                "{}: unsupported version {}",
                path.display(),
                stored.version
            )));
        }
        if stored.user != user || stored.snapshot.provider() != provider {
            warn!("{} holds data for another pair", path.display());
            return Err(StoreError::Corrupt(format!(
                "{}: stored for {} on {}",
                path.display(),
                stored.user,
                stored.snapshot.provider()
            )));
        }

        Ok(Some(stored.snapshot))
    }

    async fn put(
        &self,
        user: UserId,
        provider: ProviderId,
        snapshot: ProviderSnapshot,
    ) -> Result<(), StoreError> {
        let path = self.path_for(user, provider);
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| unavailable("creating", &dir, e))?;

        let document = StoredSnapshot {
            version: FORMAT_VERSION,
            user,
            snapshot,
        };
        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let tmp = dir.join(format!(".{}.{}.tmp", user, Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, &bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(unavailable("writing", &tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(unavailable("replacing", &path, e));
        }

        debug!("Stored {} snapshot for user {}", provider, user);
        Ok(())
    }
}
