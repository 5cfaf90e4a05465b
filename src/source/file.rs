//! File-based inventory source.
//!
//! Reads a JSON inventory dump on every fetch. Useful for demos and for
//! replaying a captured cluster state without network access.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{InventorySource, SourceError};
use crate::data::{Host, Instance};

/// On-disk layout of an inventory file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryFile {
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// A source that reads inventory from a JSON file.
///
/// The file is re-read on every call, so a process rewriting it between
/// ticks produces changing counters and therefore non-zero rates.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<InventoryFile, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl InventorySource for FileSource {
    async fn get_hosts(&self) -> Result<Vec<Host>, SourceError> {
        Ok(self.read_file().await?.hosts)
    }

    async fn get_instances(&self, host_id: &str) -> Result<Vec<Instance>, SourceError> {
        let file = self.read_file().await?;
        Ok(file.instances.into_iter().filter(|i| i.host == host_id).collect())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "hosts": [
                { "id": "pve1", "status": "online", "cpu": 0.25, "max_cpu": 16 },
                { "id": "pve2", "status": "offline" }
            ],
            "instances": [
                { "id": 100, "name": "db", "kind": "qemu", "host": "pve1", "status": "running",
                  "disk_read": 4096, "disk_write": 1024 },
                { "id": 101, "name": "cache", "kind": "lxc", "host": "pve1", "status": "stopped" },
                { "id": 200, "name": "orphan", "kind": "lxc", "host": "pve9", "status": "running" }
            ]
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/inventory.json");
        assert_eq!(source.path(), Path::new("/tmp/inventory.json"));
        assert_eq!(source.description(), "file: /tmp/inventory.json");
    }

    #[tokio::test]
    async fn test_fetch_snapshot_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let source = FileSource::new(file.path());
        let snapshot = source.fetch_snapshot().await.unwrap();

        assert_eq!(snapshot.hosts.len(), 2);
        assert_eq!(snapshot.online_count(), 1);
        // the guest on a host missing from the host list is not enumerated
        let ids: Vec<u32> = snapshot.instances.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![100, 101]);
        assert_eq!(snapshot.instances[0].disk_read, 4096);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = FileSource::new("/nonexistent/path/inventory.json");

        let err = source.fetch_snapshot().await.unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
        assert!(err.to_string().contains("Read error"));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let source = FileSource::new(file.path());

        let err = source.get_hosts().await.unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
