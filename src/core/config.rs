use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::error::DocgenResult;

/// Settings shared by every generation call.
///
/// Only `file_handler_backend_url`, `generate_document_path`, `auth_token` and
/// `request_timeout_ms` are read by the client; the other URLs are carried for
/// host applications that talk to the rest of the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocgenConfig {
    pub backend_url: String,
    pub staff_url: String,
    pub inquiry_url: String,
    pub file_handler_backend_url: String,
    pub generate_document_path: String,
    pub auth_token: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

impl DocgenConfig {
    /// Endpoint that receives generation requests. Plain concatenation, no normalisation.
    pub fn generate_url(&self) -> String {
        format!("{}{}", self.file_handler_backend_url, self.generate_document_path)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn merge(&mut self, patch: ConfigPatch) {
        if let Some(v) = patch.backend_url {
            self.backend_url = v;
        }
        if let Some(v) = patch.staff_url {
            self.staff_url = v;
        }
        if let Some(v) = patch.inquiry_url {
            self.inquiry_url = v;
        }
        if let Some(v) = patch.file_handler_backend_url {
            self.file_handler_backend_url = v;
        }
        if let Some(v) = patch.generate_document_path {
            self.generate_document_path = v;
        }
        if let Some(v) = patch.auth_token {
            self.auth_token = Some(v);
        }
        if let Some(v) = patch.request_timeout_ms {
            self.request_timeout_ms = Some(v);
        }
    }

    /// Loads `DOCGEN_*` variables (after reading `.env` if one exists).
    pub fn from_env() -> DocgenResult<Self> {
        dotenv::dotenv().ok();
        Self::load(config::Environment::with_prefix("DOCGEN"))
    }

    fn load(source: config::Environment) -> DocgenResult<Self> {
        let loaded = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize::<DocgenConfig>()?;

        Ok(loaded)
    }
}

/// Partial update for [`DocgenConfig`]; unset fields are left untouched on merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub backend_url: Option<String>,
    pub staff_url: Option<String>,
    pub inquiry_url: Option<String>,
    pub file_handler_backend_url: Option<String>,
    pub generate_document_path: Option<String>,
    pub auth_token: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

impl ConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    pub fn staff_url(mut self, url: impl Into<String>) -> Self {
        self.staff_url = Some(url.into());
        self
    }

    pub fn inquiry_url(mut self, url: impl Into<String>) -> Self {
        self.inquiry_url = Some(url.into());
        self
    }

    pub fn file_handler_backend_url(mut self, url: impl Into<String>) -> Self {
        self.file_handler_backend_url = Some(url.into());
        self
    }

    pub fn generate_document_path(mut self, path: impl Into<String>) -> Self {
        self.generate_document_path = Some(path.into());
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }
}

/// Shared, mutable configuration. Clones point at the same settings.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    inner: Arc<RwLock<DocgenConfig>>,
}

impl ConfigStore {
    pub fn new(config: DocgenConfig) -> Self {
        ConfigStore {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn get(&self) -> DocgenConfig {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, patch: ConfigPatch) {
        match self.inner.write() {
            Ok(mut guard) => guard.merge(patch),
            Err(poisoned) => poisoned.into_inner().merge(patch),
        }
    }
}

// Process-wide settings: set once at install time, read by every client built
// through `DocumentApi::from_global`. Last write wins.
static GLOBAL_CONFIG: Lazy<ConfigStore> = Lazy::new(ConfigStore::default);

pub fn default_config() -> DocgenConfig {
    DocgenConfig::default()
}

pub fn get_config() -> DocgenConfig {
    GLOBAL_CONFIG.get()
}

pub fn set_config(patch: ConfigPatch) {
    GLOBAL_CONFIG.set(patch);
}

/// Applies the host's settings to the global configuration and returns the result.
pub fn install(patch: ConfigPatch) -> DocgenConfig {
    set_config(patch);
    let config = get_config();
    tracing::info!(
        file_handler = %config.file_handler_backend_url,
        path = %config.generate_document_path,
        "docgen configuration installed"
    );
    config
}
