//! Durable session state.
//!
//! The bearer token lives in one file under the user config dir. Login
//! stores it, logout removes it; a 401 anywhere triggers [`Session::force_logout`],
//! which clears local state without waiting on the server.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::api::ApiClient;
use crate::config::{ClientConfig, config_dir};

const TOKEN_FILE: &str = "token";

/// The console's view of "who is logged in": a config plus an optional
/// persisted bearer token.
pub struct Session {
    config: ClientConfig,
    token_path: PathBuf,
    token: Option<String>,
}

impl Session {
    /// Load config and any persisted token from the user config dir.
    pub fn load() -> Result<Self> {
        let config = ClientConfig::load()?;
        let dir = config_dir().ok_or_else(|| anyhow!("Cannot determine user config directory"))?;
        Self::load_at(config, &dir)
    }

    /// Load with an explicit state directory (tests point this at a tempdir).
    pub fn load_at(config: ClientConfig, dir: &Path) -> Result<Self> {
        let token_path = dir.join(TOKEN_FILE);
        let token = match std::fs::read_to_string(&token_path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", token_path.display()));
            }
        };
        Ok(Self {
            config,
            token_path,
            token,
        })
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// An [`ApiClient`] carrying the current token (or none).
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.config.api_url.clone(), self.token.clone())
    }

    /// Authenticate against the backend and persist the returned token.
    pub fn login(&mut self, username: &str, password: &str) -> Result<String> {
        let response = ApiClient::new(self.config.api_url.clone(), None)
            .login(username, password)
            .context("Login failed")?;
        self.store_token(&response.access_token)?;
        Ok(response.message)
    }

    /// Tell the server, then clear local state. The server call is best
    /// effort: the local token goes away either way.
    pub fn logout(&mut self) -> Result<()> {
        if self.token.is_some() {
            if let Err(e) = self.client().logout() {
                tracing::warn!(error = %e, "server-side logout failed, clearing local session");
            }
        }
        self.clear_token()
    }

    /// Drop the session locally without notifying the server. This is the
    /// 401 path: the token is already dead.
    pub fn force_logout(&mut self) -> Result<()> {
        tracing::info!("session expired, clearing local token");
        self.clear_token()
    }

    fn store_token(&mut self, token: &str) -> Result<()> {
        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.token_path, token)
            .with_context(|| format!("Failed to write {}", self.token_path.display()))?;
        self.token = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&mut self) -> Result<()> {
        self.token = None;
        match std::fs::remove_file(&self.token_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove {}", self.token_path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_file_means_logged_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = Session::load_at(ClientConfig::default(), dir.path()).expect("load");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn persisted_token_survives_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("token"), "abc123\n").expect("write");

        let session = Session::load_at(ClientConfig::default(), dir.path()).expect("load");
        assert!(session.is_authenticated());
    }

    #[test]
    fn empty_token_file_means_logged_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("token"), "  \n").expect("write");

        let session = Session::load_at(ClientConfig::default(), dir.path()).expect("load");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn force_logout_removes_the_token_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("token"), "abc123").expect("write");

        let mut session = Session::load_at(ClientConfig::default(), dir.path()).expect("load");
        session.force_logout().expect("force logout");
        assert!(!session.is_authenticated());
        assert!(!dir.path().join("token").exists());

        // Idempotent: clearing an already-cleared session is fine.
        session.force_logout().expect("second force logout");
    }
}
