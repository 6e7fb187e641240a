use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::api::models::User;

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_INFO_KEY: &str = "user_info";
pub const DRAFT_KEY: &str = "vm_create_draft";

/// Persistent key-value storage for the console, the analog of the
/// browser-local storage the web shell uses. Only strings in, strings out;
/// callers own any serialization of structured values.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// File-backed storage: one JSON object on disk, rewritten on every change.
/// A missing or unreadable file is treated as empty so a first run needs no
/// setup.
pub struct FileStorage {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStorage {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "storage file is corrupt, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self { path, entries }
    }

    fn persist(&self) {
        match serde_json::to_string_pretty(&self.entries) {
            Ok(raw) => {
                if let Err(err) = fs::write(&self.path, raw) {
                    warn!(path = %self.path.display(), error = %err, "failed to persist storage file");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize storage entries"),
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.persist();
        }
    }
}

/// In-memory storage sharing its map across clones. Used by embedders that
/// manage persistence themselves and by tests.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&mut self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// Holds the bearer token and cached user profile, plus the create-form
/// draft that is saved on every input event and restored on the next load.
///
/// Draft entries are keyed by the originating DOM id with `-` replaced by
/// `_`; the reverse substitution is applied on restore.
pub struct SessionStore {
    storage: Box<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|token| !token.is_empty())
    }

    pub fn set_token(&mut self, token: &str) {
        self.storage.set(TOKEN_KEY, token);
    }

    /// Drops the token and cached user info. Called on explicit logout and
    /// on any 401 from the API.
    pub fn clear(&mut self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USER_INFO_KEY);
    }

    pub fn cache_user(&mut self, user: &User) {
        match serde_json::to_string(user) {
            Ok(raw) => self.storage.set(USER_INFO_KEY, &raw),
            Err(err) => warn!(error = %err, "failed to serialize user info"),
        }
    }

    pub fn cached_user(&self) -> Option<User> {
        let raw = self.storage.get(USER_INFO_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn save_draft_field(&mut self, dom_id: &str, value: &str) {
        let mut draft = self.load_draft();
        draft.insert(storage_key(dom_id), value.to_string());
        match serde_json::to_string(&draft) {
            Ok(raw) => self.storage.set(DRAFT_KEY, &raw),
            Err(err) => warn!(error = %err, "failed to serialize form draft"),
        }
    }

    /// Returns `(dom_id, value)` pairs for every saved draft field.
    pub fn draft_fields(&self) -> Vec<(String, String)> {
        self.load_draft()
            .into_iter()
            .map(|(key, value)| (dom_id(&key), value))
            .collect()
    }

    pub fn clear_draft(&mut self) {
        self.storage.remove(DRAFT_KEY);
    }

    fn load_draft(&self) -> HashMap<String, String> {
        self.storage
            .get(DRAFT_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

fn storage_key(dom_id: &str) -> String {
    dom_id.replace('-', "_")
}

fn dom_id(storage_key: &str) -> String {
    storage_key.replace('_', "-")
}
