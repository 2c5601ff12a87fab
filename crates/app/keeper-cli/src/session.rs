//! Session cookies persisted between CLI invocations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// The two session cookie values last handed out by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// `<data dir>/keeper/cli-session.json`, falling back to the working
/// directory when the platform has no data dir.
pub fn default_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("keeper"))
        .unwrap_or_default()
        .join("cli-session.json")
}

/// A missing file is an empty session.
pub fn load(path: &Path) -> Result<Session> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Session::default()),
        Err(e) => Err(e.into()),
    }
}

/// Write `session`, or remove the file when it is empty.
pub fn store(path: &Path, session: &Session) -> Result<()> {
    if session.is_empty() {
        return match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        };
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(session)?)?;
    log::debug!("session saved to {}", path.display());
    Ok(())
}
