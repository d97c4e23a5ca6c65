use sprintboard_core::SprintboardResult;
use std::path::Path;
use tokio::fs;

/// Writes whole files through a temp file in the same directory followed by
/// a rename, so readers never observe a partial file.
pub struct AtomicWriter;

impl AtomicWriter {
    pub async fn write_atomic(path: &Path, data: &[u8]) -> SprintboardResult<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).await?;

        // keep the guard alive until the rename so the temp file is not
        // removed early
        let temp_file = tempfile::NamedTempFile::new_in(parent)?;
        let temp_path = temp_file.path().to_path_buf();
        fs::write(&temp_path, data).await?;
        fs::rename(&temp_path, path).await?;
        drop(temp_file);

        tracing::debug!(
            "Atomically wrote {} bytes to {}",
            data.len(),
            path.display()
        );
        Ok(())
    }

    /// Read the whole file, or `None` when it does not exist
    pub async fn read_optional(path: &Path) -> SprintboardResult<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(data) => {
                tracing::debug!("Read {} bytes from {}", data.len(), path.display());
                Ok(Some(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
