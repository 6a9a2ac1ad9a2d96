//! Persistence of the bearer token between runs.
//!
//! Only the token is persisted, under the fixed key [`STORAGE_KEY`]. The
//! user profile is always re-fetched on startup.

use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use support_desk_core::{DeskError, Result};

/// Key under which the token is stored.
pub const STORAGE_KEY: &str = "access_token";

/// Where the session token lives between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON file holding `{ "access_token": "<token>" }`.
///
/// Other keys in the file are left untouched.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(storage_error(&self.path, e)),
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => Err(DeskError::Storage(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_map(&self, map: Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| storage_error(parent, e))?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| DeskError::Storage(e.to_string()))?;
        write_private(&self.path, content.as_bytes()).map_err(|e| storage_error(&self.path, e))
    }
}

/// Write `bytes` to `path`, readable by the owner only on unix.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        // `mode` only applies on creation; tighten files left by older runs.
        if path.exists() {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)
}

fn storage_error(path: &Path, err: std::io::Error) -> DeskError {
    DeskError::Storage(format!("{}: {}", path.display(), err))
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let map = self.read_map()?;
        Ok(map
            .get(STORAGE_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(STORAGE_KEY.to_string(), Value::String(token.to_string()));
        self.write_map(map)
    }

    fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        // An unreadable file holds no usable token; overwrite it.
        let mut map = self.read_map().unwrap_or_default();
        map.remove(STORAGE_KEY);
        self.write_map(map)
    }
}

/// In-process store, for tests and one-shot sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<String>>> {
        self.token
            .lock()
            .map_err(|_| DeskError::Storage("token store lock poisoned".into()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.lock()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}
