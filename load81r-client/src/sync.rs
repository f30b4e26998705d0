//! Recursive tree mirroring between the local disk and the device.
//!
//! Built only on [`Session`] operations; nothing here touches the wire
//! directly. Traversal is depth-first over an explicit work stack, one
//! entry at a time, so no transfer starts before the previous response has
//! been fully drained.
//!
//! Per-entry failures (a `-ERR` from the device, a local I/O error) are
//! recorded and the walk continues with the next entry. A fatal error
//! (transport failure, lost framing) stops the walk because the connection
//! is gone.
//!
//! Within a directory, files are visited before subdirectories and each
//! group is sorted by name, so the command sequence is deterministic.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use load81r_types::join_remote;
use thiserror::Error;

use crate::error::ClientError;
use crate::session::Session;
use crate::transport::Transport;

/// Which way a sync copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Device to local disk.
    Download,
    /// Local disk to device.
    Upload,
}

/// One pending unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPlan {
    /// Copy a remote entry to a local path.
    Download {
        /// Remote source path.
        remote: String,
        /// Local destination path.
        local: PathBuf,
        /// Whether the remote entry is a directory.
        is_dir: bool,
    },
    /// Copy a local entry to a remote path.
    Upload {
        /// Local source path.
        local: PathBuf,
        /// Remote destination path.
        remote: String,
    },
}

/// An entry that could not be copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    /// Path of the failed entry (remote or local, whichever failed).
    pub path: String,
    /// What went wrong.
    pub reason: String,
}

/// Why a traversal stopped before visiting every entry.
#[derive(Debug)]
pub enum StopReason {
    /// The connection failed.
    Aborted(ClientError),
    /// The cancellation flag was raised.
    Interrupted,
}

/// Outcome of one sync call.
#[derive(Debug)]
pub struct SyncReport {
    /// Direction of the copy.
    pub direction: Direction,
    /// Files copied successfully.
    pub files: usize,
    /// Bytes copied successfully.
    pub bytes: u64,
    /// Entries that failed.
    pub failures: Vec<SyncFailure>,
    /// Set if the walk ended early.
    pub stopped: Option<StopReason>,
}

/// Aggregate failure of a sync call.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Some entries failed, the rest were copied.
    #[error("{failed} entries failed ({files} files copied)")]
    Partial {
        /// Files copied.
        files: usize,
        /// Entries that failed.
        failed: usize,
    },

    /// The connection failed part-way.
    #[error("aborted after {files} files: {source}")]
    Aborted {
        /// Files copied before the failure.
        files: usize,
        /// The fatal error.
        #[source]
        source: ClientError,
    },

    /// Cancelled between steps.
    #[error("interrupted after {files} files")]
    Interrupted {
        /// Files copied before cancellation.
        files: usize,
    },
}

impl SyncReport {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            files: 0,
            bytes: 0,
            failures: Vec::new(),
            stopped: None,
        }
    }

    /// True if every entry was copied.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.stopped.is_none()
    }

    /// Turn the report into a result, keeping it on success.
    pub fn into_result(self) -> Result<SyncReport, SyncError> {
        match self.stopped {
            Some(StopReason::Aborted(source)) => Err(SyncError::Aborted {
                files: self.files,
                source,
            }),
            Some(StopReason::Interrupted) => Err(SyncError::Interrupted { files: self.files }),
            None if !self.failures.is_empty() => Err(SyncError::Partial {
                files: self.files,
                failed: self.failures.len(),
            }),
            None => Ok(self),
        }
    }

    fn fail(&mut self, path: impl Into<String>, reason: impl ToString) {
        let failure = SyncFailure {
            path: path.into(),
            reason: reason.to_string(),
        };
        tracing::warn!("Sync failed for {}: {}", failure.path, failure.reason);
        self.failures.push(failure);
    }

    fn copied(&mut self, bytes: usize) {
        self.files += 1;
        self.bytes += bytes as u64;
    }
}

type Progress<'a> = Box<dyn FnMut(&str, u64) + 'a>;

/// Walks a tree on one side and replicates it to the other.
pub struct SyncEngine<'a, T: Transport> {
    session: &'a mut Session<T>,
    cancel: Option<Arc<AtomicBool>>,
    progress: Option<Progress<'a>>,
}

impl<'a, T: Transport> SyncEngine<'a, T> {
    /// Create an engine driving the given session.
    pub fn new(session: &'a mut Session<T>) -> Self {
        Self {
            session,
            cancel: None,
            progress: None,
        }
    }

    /// Stop between steps once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Call `f(path, bytes)` after each file is copied.
    pub fn on_progress(mut self, f: impl FnMut(&str, u64) + 'a) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// Mirror the remote directory `remote` into the local directory `local`.
    pub fn download(&mut self, remote: &str, local: &Path) -> SyncReport {
        tracing::info!("Syncing {} -> {}", remote, local.display());
        let root = SyncPlan::Download {
            remote: remote.to_string(),
            local: local.to_path_buf(),
            is_dir: true,
        };
        self.run(Direction::Download, root)
    }

    /// Mirror the local file or directory `local` to `remote` on the device.
    pub fn upload(&mut self, local: &Path, remote: &str) -> SyncReport {
        tracing::info!("Syncing {} -> {}", local.display(), remote);
        let root = SyncPlan::Upload {
            local: local.to_path_buf(),
            remote: remote.to_string(),
        };
        self.run(Direction::Upload, root)
    }

    fn run(&mut self, direction: Direction, root: SyncPlan) -> SyncReport {
        let mut report = SyncReport::new(direction);
        let mut stack = vec![root];

        while let Some(plan) = stack.pop() {
            if self.cancelled() {
                tracing::info!("Sync interrupted with {} entries pending", stack.len() + 1);
                report.stopped = Some(StopReason::Interrupted);
                break;
            }

            let step = match plan {
                SyncPlan::Download {
                    remote,
                    local,
                    is_dir: true,
                } => self.download_dir(&remote, &local, &mut stack, &mut report),
                SyncPlan::Download {
                    remote,
                    local,
                    is_dir: false,
                } => self.download_file(&remote, &local, &mut report),
                SyncPlan::Upload { local, remote } => {
                    self.upload_entry(&local, &remote, &mut stack, &mut report)
                }
            };

            if let Err(e) = step {
                tracing::warn!("Sync aborted: {}", e);
                report.stopped = Some(StopReason::Aborted(e));
                break;
            }
        }

        tracing::info!(
            "Sync finished: {} files, {} bytes, {} failures",
            report.files,
            report.bytes,
            report.failures.len()
        );
        report
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn notify(&mut self, path: &str, bytes: usize) {
        if let Some(progress) = self.progress.as_mut() {
            progress(path, bytes as u64);
        }
    }

    /// Record a non-fatal error, or hand a fatal one back to stop the walk.
    fn absorb(
        report: &mut SyncReport,
        path: &str,
        err: ClientError,
    ) -> Result<(), ClientError> {
        if err.is_fatal() {
            return Err(err);
        }
        report.fail(path, err);
        Ok(())
    }

    fn download_dir(
        &mut self,
        remote: &str,
        local: &Path,
        stack: &mut Vec<SyncPlan>,
        report: &mut SyncReport,
    ) -> Result<(), ClientError> {
        if let Err(e) = fs::create_dir_all(local) {
            report.fail(local.display().to_string(), e);
            return Ok(());
        }

        let mut entries = match self.session.ls(Some(remote)) {
            Ok(entries) => entries,
            Err(e) => return Self::absorb(report, remote, e),
        };
        entries.sort_by(|a, b| a.is_dir.cmp(&b.is_dir).then_with(|| a.name.cmp(&b.name)));

        for entry in entries.into_iter().rev() {
            let remote_child = join_remote(remote, &entry.name);
            if !is_plain_name(&entry.name) {
                report.fail(remote_child, "refusing unsafe entry name");
                continue;
            }
            stack.push(SyncPlan::Download {
                local: local.join(&entry.name),
                remote: remote_child,
                is_dir: entry.is_dir,
            });
        }
        Ok(())
    }

    fn download_file(
        &mut self,
        remote: &str,
        local: &Path,
        report: &mut SyncReport,
    ) -> Result<(), ClientError> {
        let data = match self.session.cat(remote) {
            Ok(data) => data,
            Err(e) => return Self::absorb(report, remote, e),
        };
        match fs::write(local, &data) {
            Ok(()) => {
                tracing::debug!("Downloaded {} ({} bytes)", remote, data.len());
                report.copied(data.len());
                self.notify(remote, data.len());
            }
            Err(e) => report.fail(local.display().to_string(), e),
        }
        Ok(())
    }

    fn upload_entry(
        &mut self,
        local: &Path,
        remote: &str,
        stack: &mut Vec<SyncPlan>,
        report: &mut SyncReport,
    ) -> Result<(), ClientError> {
        let meta = match fs::metadata(local) {
            Ok(meta) => meta,
            Err(e) => {
                report.fail(local.display().to_string(), e);
                return Ok(());
            }
        };

        if meta.is_file() {
            let data = match fs::read(local) {
                Ok(data) => data,
                Err(e) => {
                    report.fail(local.display().to_string(), e);
                    return Ok(());
                }
            };
            match self.session.put(remote, &data) {
                Ok(()) => {
                    tracing::debug!("Uploaded {} ({} bytes)", remote, data.len());
                    report.copied(data.len());
                    self.notify(&local.display().to_string(), data.len());
                    Ok(())
                }
                Err(e) => Self::absorb(report, remote, e),
            }
        } else if meta.is_dir() {
            match self.session.mkdir(remote) {
                Ok(()) => {}
                // Usually "already exists"; later PUTs report anything worse.
                Err(ClientError::Server(msg)) => {
                    tracing::debug!("MKDIR {} refused: {}", remote, msg);
                }
                Err(e) => return Self::absorb(report, remote, e),
            }
            self.queue_local_children(local, remote, stack, report);
            Ok(())
        } else {
            report.fail(local.display().to_string(), "not a regular file or directory");
            Ok(())
        }
    }

    fn queue_local_children(
        &mut self,
        local: &Path,
        remote: &str,
        stack: &mut Vec<SyncPlan>,
        report: &mut SyncReport,
    ) {
        let dir = match fs::read_dir(local) {
            Ok(dir) => dir,
            Err(e) => {
                report.fail(local.display().to_string(), e);
                return;
            }
        };

        let mut children = Vec::new();
        for entry in dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    report.fail(local.display().to_string(), e);
                    continue;
                }
            };
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                report.fail(path.display().to_string(), "file name is not valid UTF-8");
                continue;
            };
            let is_dir = path.is_dir();
            children.push((is_dir, name, path));
        }
        children.sort();

        for (_, name, path) in children.into_iter().rev() {
            stack.push(SyncPlan::Upload {
                local: path,
                remote: join_remote(remote, &name),
            });
        }
    }
}

/// A listing name that is safe to join onto a local directory.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
