//! File Chunk Sink - 文件系统分块输出
//!
//! 实现 ChunkSinkPort trait。先写入同目录临时文件再重命名，
//! 读者不会看到写了一半的输出。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{format_chunks, ChunkSinkPort, SinkError};
use crate::domain::Chunk;

/// 文件分块输出
pub struct FileChunkSink {
    path: PathBuf,
}

impl FileChunkSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl ChunkSinkPort for FileChunkSink {
    async fn write(&self, chunks: &[Chunk]) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SinkError::IoError(e.to_string()))?;
        }

        let content = format_chunks(chunks);
        let temp = self.temp_path();

        fs::write(&temp, content.as_bytes())
            .await
            .map_err(|e| SinkError::IoError(e.to_string()))?;
        if let Err(e) = fs::rename(&temp, &self.path).await {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                tracing::warn!(
                    path = %temp.display(),
                    error = %cleanup,
                    "Failed to remove temporary chunk file"
                );
            }
            return Err(SinkError::IoError(e.to_string()));
        }

        tracing::debug!(
            path = %self.path.display(),
            chunks = chunks.len(),
            bytes = content.len(),
            "Chunks written to file"
        );

        Ok(())
    }
}
