//! Key-value persistence for the debug panel state.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::StoreError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// All keys in one JSON object file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `SLOPEBOX_STATE`, or `slopebox-state.json` in the working directory.
    pub fn from_env() -> Self {
        let path = std::env::var("SLOPEBOX_STATE").unwrap_or_else(|_| "slopebox-state.json".to_string());
        Self::new(path)
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(src) => Ok(serde_json::from_str(&src)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

#[cfg(target_arch = "wasm32")]
mod local_storage {
    use super::*;
    use wasm_bindgen::JsValue;

    /// `window.localStorage`
    pub struct LocalStorageStore {
        storage: web_sys::Storage,
    }

    impl LocalStorageStore {
        pub fn new(window: &web_sys::Window) -> Result<Self, StoreError> {
            let storage = window
                .local_storage()
                .map_err(js_to_store_error)?
                .ok_or_else(|| StoreError::Browser("localStorage unavailable".to_string()))?;
            Ok(Self { storage })
        }
    }

    fn js_to_store_error(e: JsValue) -> StoreError {
        StoreError::Browser(format!("{e:?}"))
    }

    impl KeyValueStore for LocalStorageStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.storage.get_item(key).map_err(js_to_store_error)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.storage.set_item(key, value).map_err(js_to_store_error)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.storage.remove_item(key).map_err(js_to_store_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("guiState").unwrap(), None);
        store.set("guiState", "{}").unwrap();
        assert_eq!(store.get("guiState").unwrap().as_deref(), Some("{}"));
        store.remove("guiState").unwrap();
        assert_eq!(store.get("guiState").unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let path = std::env::temp_dir().join(format!("slopebox-store-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut store = FileStore::new(&path);
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        let mut reopened = FileStore::new(&path);
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("1"));
        reopened.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let path = std::env::temp_dir().join(format!("slopebox-corrupt-{}.json", std::process::id()));
        std::fs::write(&path, "not json").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(store.get("a"), Err(StoreError::Json(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
