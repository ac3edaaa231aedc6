// SPDX-License-Identifier: MIT

//! The per-project provisioning sidecar file.
//!
//! Replaces the global mutable "have we provisioned this project" flag with a
//! small file read at project discovery and written by the provisioning sink.
//! Its absence means "never provisioned", never an error.

use std::path::Path;

use serde::{Deserialize, Serialize};

pub const SIDECAR_RELATIVE_PATH: &str = ".local/sync-agent.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sidecar {
    pub last_agent_id: String,
}

/// Read the sidecar under `filesystem_path`. A missing file or one that fails to
/// parse is treated as "never provisioned", not an error.
pub fn read(filesystem_path: &Path) -> Option<Sidecar> {
    let contents = std::fs::read_to_string(filesystem_path.join(SIDECAR_RELATIVE_PATH)).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Write the sidecar under `filesystem_path`, creating the `.local/` directory if
/// needed. Failures are the caller's to log; provisioning is best-effort already.
pub fn write(filesystem_path: &Path, agent_id: &str) -> std::io::Result<()> {
    let path = filesystem_path.join(SIDECAR_RELATIVE_PATH);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let sidecar = Sidecar { last_agent_id: agent_id.to_string() };
    let contents = serde_json::to_string_pretty(&sidecar).unwrap_or_default();
    std::fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_sidecar_reads_as_none() {
        let dir = tempdir().expect("tempdir");
        assert_eq!(read(dir.path()), None);
    }

    #[test]
    fn written_sidecar_round_trips() {
        let dir = tempdir().expect("tempdir");
        write(dir.path(), "agent-42").expect("write succeeds");
        assert_eq!(read(dir.path()), Some(Sidecar { last_agent_id: "agent-42".to_string() }));
    }

    #[test]
    fn malformed_sidecar_reads_as_none() {
        let dir = tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join(".local")).expect("mkdir");
        std::fs::write(dir.path().join(SIDECAR_RELATIVE_PATH), "not json").expect("write");
        assert_eq!(read(dir.path()), None);
    }
}
