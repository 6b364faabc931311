use super::{LogEntry, Recorder, RecorderError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::debug;

/// Appends entries to a JSON Lines file.
///
/// The file is opened in append mode so that re-runs extend the same log.
/// Each entry is serialized before the lock is taken and written with a
/// single `write_all` followed by a flush.
pub struct JsonlRecorder {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlRecorder {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RecorderError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        debug!("Recording run log to {:?}", path);

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Recorder for JsonlRecorder {
    async fn append(&self, entry: &LogEntry) -> Result<(), RecorderError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), RecorderError> {
        let mut writer = self.writer.lock().await;
        writer.flush().await?;
        writer.get_ref().sync_all().await?;
        Ok(())
    }
}
