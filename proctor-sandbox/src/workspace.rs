//! Per-submission scratch directories
//!
//! Every submission gets a fresh directory named
//! `<root>/<submission-id>-<random-token>`. The directory is removed by
//! [`Workspace::destroy`] on the normal path; if a [`Workspace`] is dropped
//! without being destroyed (panic, cancelled future) `Drop` removes it
//! synchronously as a fallback.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proctor_common::SubmissionId;
use uuid::Uuid;

use crate::error::WorkspaceError;

/// Allocates workspaces under a common root
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
    created: Arc<AtomicUsize>,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            created: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of workspaces created so far by this manager (and its clones).
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Create a collision-free directory for `owner`.
    pub async fn create(&self, owner: SubmissionId) -> Result<Workspace, WorkspaceError> {
        let token = Uuid::new_v4().simple().to_string();
        let path = self.root.join(format!("{}-{}", owner, &token[..12]));

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| WorkspaceError::Create {
                path: path.clone(),
                source,
            })?;
        self.created.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(submission_id = %owner, path = %path.display(), "Workspace created");
        Ok(Workspace {
            path,
            owner,
            destroyed: false,
        })
    }
}

/// Exclusively owned scratch directory for one submission
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    owner: SubmissionId,
    destroyed: bool,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `contents` to `name` inside the workspace.
    pub async fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf, WorkspaceError> {
        let path = self.path.join(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| WorkspaceError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Remove the directory tree. Already-missing directories are not an error.
    pub async fn destroy(mut self) -> Result<(), WorkspaceError> {
        self.destroyed = true;
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {
                tracing::debug!(submission_id = %self.owner, "Workspace destroyed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(WorkspaceError::Destroy {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.destroyed {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    submission_id = %self.owner,
                    path = %self.path.display(),
                    "Failed to remove abandoned workspace: {}",
                    e
                );
            }
        }
    }
}
