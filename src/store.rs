use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::{StoredUser, UserProfile};

const USERS_FILE: &str = "users.json";
const CONFIG_FILE: &str = "config.json";
const SESSION_FILE: &str = "session.json";
const STORE_VERSION: u32 = 1;

pub const DEFAULT_LOGIN_BG_URL: &str = "https://images.unsplash.com/photo-1540747913346-19e32dc3e97e?q=80&w=2505&auto=format&fit=crop";

/// Branding the admin can customize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub logo_url: String,
    pub login_bg_url: String,
    pub app_bg_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logo_url: String::new(),
            login_bg_url: DEFAULT_LOGIN_BG_URL.to_string(),
            app_bg_url: String::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Record<T> {
    version: u32,
    data: T,
}

/// Three JSON records in one directory. Without a directory nothing is
/// persisted and every load returns the default.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: Option<PathBuf>,
}

impl SessionStore {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn in_memory() -> Self {
        Self { dir: None }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn load_users(&self) -> Vec<StoredUser> {
        self.load(USERS_FILE).unwrap_or_default()
    }

    pub fn save_users(&self, users: &[StoredUser]) -> Result<()> {
        self.save(USERS_FILE, &users)
    }

    pub fn load_config(&self) -> AppConfig {
        self.load(CONFIG_FILE).unwrap_or_default()
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        self.save(CONFIG_FILE, config)
    }

    pub fn load_session(&self) -> Option<UserProfile> {
        self.load(SESSION_FILE)
    }

    pub fn save_session(&self, user: Option<&UserProfile>) -> Result<()> {
        match user {
            Some(user) => self.save(SESSION_FILE, user),
            None => {
                let Some(path) = self.path(SESSION_FILE) else {
                    return Ok(());
                };
                if path.exists() {
                    fs::remove_file(&path)
                        .with_context(|| format!("remove session {}", path.display()))?;
                }
                Ok(())
            }
        }
    }

    fn path(&self, file: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(file))
    }

    fn load<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.path(file)?;
        let raw = fs::read_to_string(&path).ok()?;
        let record = match serde_json::from_str::<Record<T>>(&raw) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable store record");
                return None;
            }
        };
        if record.version != STORE_VERSION {
            return None;
        }
        Some(record.data)
    }

    fn save<T: Serialize>(&self, file: &str, data: &T) -> Result<()> {
        let Some(path) = self.path(file) else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let record = Record {
            version: STORE_VERSION,
            data,
        };
        let json = serde_json::to_string_pretty(&record).context("serialize store record")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("swap {}", path.display()))?;
        Ok(())
    }
}
