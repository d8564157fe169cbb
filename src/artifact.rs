//! Turns code segments into temporary files for one outgoing response.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use crate::lang::extension_for;
use crate::segment::Segment;

/// Errors from scratch-space handling.
#[derive(Debug)]
pub enum ArtifactError {
    /// Failed to create the scratch directory.
    CreateDir { path: PathBuf, source: std::io::Error },
    /// Failed to write a code file.
    WriteFile { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(f, "failed to create scratch dir '{}': {}", path.display(), source)
            }
            Self::WriteFile { path, source } => {
                write!(f, "failed to write code file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ArtifactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } | Self::WriteFile { source, .. } => Some(source),
        }
    }
}

/// Monotonic part of the per-response directory name. The timestamp alone
/// could collide for two requests landing in the same millisecond.
static RESPONSE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Scratch area owned by a single response.
///
/// Each response gets its own subdirectory under the shared scratch root, so
/// concurrent invocations never contend on a file name.
pub struct ResponseScratch {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl ResponseScratch {
    /// Ensure the scratch root exists and create a unique subdirectory in it.
    pub async fn create(root: &Path) -> Result<Self, ArtifactError> {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| ArtifactError::CreateDir { path: root.to_path_buf(), source: e })?;

        let seq = RESPONSE_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = root.join(format!("resp-{}-{}", chrono::Utc::now().timestamp_millis(), seq));
        tokio::fs::create_dir(&dir)
            .await
            .map_err(|e| ArtifactError::CreateDir { path: dir.clone(), source: e })?;

        Ok(Self { dir, files: Vec::new() })
    }

    /// Walk the segments in order, writing each code segment to a file and
    /// composing the outgoing message text.
    ///
    /// File names are `main.<ext>` for the first code segment of a given
    /// extension and `main<N>.<ext>` for the Nth, counted per response.
    pub async fn materialize(&mut self, segments: &[Segment]) -> Result<String, ArtifactError> {
        let mut counters: HashMap<&'static str, u32> = HashMap::new();
        let mut message = String::new();

        for segment in segments {
            match segment {
                Segment::Text { content } => {
                    message.push_str(content);
                    message.push_str("\n\n");
                }
                Segment::Code { language, content } => {
                    let ext = extension_for(language);
                    let count = counters.entry(ext).or_insert(0);
                    *count += 1;

                    let file_name = if *count == 1 {
                        format!("main.{ext}")
                    } else {
                        format!("main{count}.{ext}")
                    };

                    let path = self.dir.join(&file_name);
                    tokio::fs::write(&path, content)
                        .await
                        .map_err(|e| ArtifactError::WriteFile { path: path.clone(), source: e })?;
                    self.files.push(path);

                    message.push_str(&format!("[Kod dosyası: {file_name}]\n\n"));
                }
            }
        }

        Ok(message)
    }

    /// Paths of the files written so far, in segment order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Path of the per-response directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Delete every written file, then the per-response directory.
    ///
    /// A failed deletion is logged and does not stop the rest. Files written
    /// before a mid-materialization failure are deleted too; a failed write
    /// can leave an entry that was never recorded in `files`, so the final
    /// sweep removes the directory with whatever is still in it.
    pub async fn remove(&self) {
        for file in &self.files {
            if let Err(e) = tokio::fs::remove_file(file).await {
                warn!("Failed to delete temp file '{}': {e}", file.display());
            }
        }
        if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
            warn!("Failed to delete scratch dir '{}': {e}", self.dir.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn code(lang: &str, content: &str) -> Segment {
        Segment::Code {
            language: lang.to_string(),
            content: content.to_string(),
        }
    }

    fn text(content: &str) -> Segment {
        Segment::Text {
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_unique_names_per_extension() {
        let root = TempDir::new().unwrap();
        let mut scratch = ResponseScratch::create(root.path()).await.unwrap();

        let segments = vec![code("python", "a"), code("python", "b"), code("python", "c")];
        scratch.materialize(&segments).await.unwrap();

        let names: Vec<_> = scratch
            .files()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["main.py", "main2.py", "main3.py"]);

        scratch.remove().await;
    }

    #[tokio::test]
    async fn test_counters_are_per_extension() {
        let root = TempDir::new().unwrap();
        let mut scratch = ResponseScratch::create(root.path()).await.unwrap();

        let segments = vec![code("python", "a"), code("rust", "b"), code("python", "c")];
        scratch.materialize(&segments).await.unwrap();

        let names: Vec<_> = scratch
            .files()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["main.py", "main.rs", "main2.py"]);

        scratch.remove().await;
    }

    #[tokio::test]
    async fn test_message_interleaves_prose_and_placeholders() {
        let root = TempDir::new().unwrap();
        let mut scratch = ResponseScratch::create(root.path()).await.unwrap();

        let segments = vec![text("Here:"), code("python", "print(1)"), text("done")];
        let message = scratch.materialize(&segments).await.unwrap();

        assert_eq!(message, "Here:\n\n[Kod dosyası: main.py]\n\ndone\n\n");
        let content = std::fs::read_to_string(&scratch.files()[0]).unwrap();
        assert_eq!(content, "print(1)");

        scratch.remove().await;
    }

    #[tokio::test]
    async fn test_empty_code_segment_writes_empty_file() {
        let root = TempDir::new().unwrap();
        let mut scratch = ResponseScratch::create(root.path()).await.unwrap();

        scratch.materialize(&[code("python", "")]).await.unwrap();

        let path = &scratch.files()[0];
        assert_eq!(std::fs::metadata(path).unwrap().len(), 0);

        scratch.remove().await;
    }

    #[tokio::test]
    async fn test_remove_deletes_files_and_dir() {
        let root = TempDir::new().unwrap();
        let mut scratch = ResponseScratch::create(root.path()).await.unwrap();
        scratch.materialize(&[code("python", "x")]).await.unwrap();

        let file = scratch.files()[0].clone();
        let dir = file.parent().unwrap().to_path_buf();
        assert!(file.exists());

        scratch.remove().await;
        assert!(!file.exists());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_remove_after_failed_materialize_deletes_written_files() {
        let root = TempDir::new().unwrap();
        let mut scratch = ResponseScratch::create(root.path()).await.unwrap();

        // A directory squatting on the second file's name makes its write fail.
        std::fs::create_dir(scratch.dir().join("main.rs")).unwrap();

        let segments = vec![code("python", "print(1)"), code("rust", "fn main() {}")];
        let err = scratch.materialize(&segments).await.unwrap_err();
        assert!(matches!(err, ArtifactError::WriteFile { .. }));

        // The first file made it to disk before the failure.
        assert_eq!(scratch.files().len(), 1);
        assert!(scratch.files()[0].exists());

        scratch.remove().await;
        assert!(!scratch.files()[0].exists());
        assert!(!scratch.dir().exists());
    }

    #[tokio::test]
    async fn test_remove_sweeps_unrecorded_entries() {
        let root = TempDir::new().unwrap();
        let mut scratch = ResponseScratch::create(root.path()).await.unwrap();
        scratch.materialize(&[code("python", "x")]).await.unwrap();

        // Simulates a partial write that never reached the file list.
        std::fs::write(scratch.dir().join("stray.txt"), "leftover").unwrap();

        scratch.remove().await;
        assert!(!scratch.dir().exists());
    }

    #[tokio::test]
    async fn test_concurrent_responses_get_distinct_dirs() {
        let root = TempDir::new().unwrap();
        let mut a = ResponseScratch::create(root.path()).await.unwrap();
        let mut b = ResponseScratch::create(root.path()).await.unwrap();

        a.materialize(&[code("python", "from a")]).await.unwrap();
        b.materialize(&[code("python", "from b")]).await.unwrap();

        assert_ne!(a.files()[0], b.files()[0]);
        assert_eq!(std::fs::read_to_string(&a.files()[0]).unwrap(), "from a");
        assert_eq!(std::fs::read_to_string(&b.files()[0]).unwrap(), "from b");

        a.remove().await;
        b.remove().await;
    }

    #[tokio::test]
    async fn test_create_builds_missing_root() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("deep").join("temp");
        let scratch = ResponseScratch::create(&nested).await.unwrap();
        assert!(nested.exists());
        scratch.remove().await;
    }
}
