#![allow(dead_code)]

use async_trait::async_trait;
use hub_sync_core::contract::{ReleaseAsset, ReleaseStore, StoreError};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// Release store kept in memory: asset name → bytes, plus an upload log.
#[derive(Default)]
pub struct InMemoryStore {
    assets: Mutex<BTreeMap<String, Vec<u8>>>,
    uploads: Mutex<Vec<String>>,
}

impl InMemoryStore {
    pub fn with_assets(names: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut assets = store.assets.lock().unwrap();
            for name in names {
                assets.insert(name.to_string(), b"previously published".to_vec());
            }
        }
        store
    }

    pub fn asset_names(&self) -> Vec<String> {
        self.assets.lock().unwrap().keys().cloned().collect()
    }

    pub fn asset(&self, name: &str) -> Option<Vec<u8>> {
        self.assets.lock().unwrap().get(name).cloned()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn clear_uploads(&self) {
        self.uploads.lock().unwrap().clear();
    }
}

#[async_trait]
impl ReleaseStore for InMemoryStore {
    async fn list_assets(&self, _release_tag: &str) -> Result<Vec<ReleaseAsset>, StoreError> {
        Ok(self
            .assets
            .lock()
            .unwrap()
            .iter()
            .map(|(name, bytes)| ReleaseAsset {
                name: name.clone(),
                size: bytes.len() as u64,
            })
            .collect())
    }

    async fn upload(&self, _release_tag: &str, file: &Path, clobber: bool) -> Result<(), StoreError> {
        let name = file.file_name().unwrap().to_string_lossy().into_owned();
        let bytes = std::fs::read(file)?;
        let mut assets = self.assets.lock().unwrap();
        if assets.contains_key(&name) && !clobber {
            return Err(format!("{name} already exists").into());
        }
        assets.insert(name.clone(), bytes);
        self.uploads.lock().unwrap().push(name);
        Ok(())
    }
}

/// Store whose calls take longer than any sensible timeout.
pub struct SlowStore {
    pub list_delay: Duration,
    pub upload_delay: Duration,
}

impl SlowStore {
    /// Listing answers at once (with no assets); every upload stalls.
    pub fn stalled_uploads(delay: Duration) -> Self {
        SlowStore {
            list_delay: Duration::ZERO,
            upload_delay: delay,
        }
    }
}

#[async_trait]
impl ReleaseStore for SlowStore {
    async fn list_assets(&self, _release_tag: &str) -> Result<Vec<ReleaseAsset>, StoreError> {
        tokio::time::sleep(self.list_delay).await;
        Ok(vec![])
    }

    async fn upload(&self, _release_tag: &str, _file: &Path, _clobber: bool) -> Result<(), StoreError> {
        tokio::time::sleep(self.upload_delay).await;
        Ok(())
    }
}
