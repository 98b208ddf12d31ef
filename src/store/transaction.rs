//! Write, verify, and commit or roll back.

use super::MetadataBackend;
use crate::error::{Error, Result, RoundTripFailure};
use crate::model::Pdf;
use log::{debug, error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Progress of a [`WriteTransaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    Idle,
    Writing,
    Verifying,
    Committed,
    RolledBack,
}

/// Writes a [`Pdf`] into its file and keeps the result only if the file
/// reads back as the same record.
///
/// The backend leaves a backup of the previous file next to it. After a
/// successful verification the backup is deleted; otherwise it is moved
/// back over the file.
pub struct WriteTransaction<'a, B: MetadataBackend + ?Sized> {
    backend: &'a B,
    pdf: &'a Pdf,
    state: WriteState,
}

impl<'a, B: MetadataBackend + ?Sized> WriteTransaction<'a, B> {
    pub fn new(backend: &'a B, pdf: &'a Pdf) -> Self {
        Self {
            backend,
            pdf,
            state: WriteState::Idle,
        }
    }

    pub fn state(&self) -> WriteState {
        self.state
    }

    /// Run the transaction.
    ///
    /// A backend failure is returned as is and leaves the state at
    /// `Writing`; nothing is restored since the backend changed nothing.
    pub fn run(&mut self) -> Result<()> {
        let path = self.pdf.source_file();
        let raw = self.pdf.serialize();

        self.state = WriteState::Writing;
        debug!(
            "Writing {} tags to {} ({} null, {} unchecked)",
            raw.values.len(),
            path.display(),
            raw.null_tags.len(),
            raw.unchecked_tags.len()
        );
        self.backend.write(path, &raw)?;

        let guard = BackupGuard::new(path, self.backend.backup_path(path));
        debug!("Backup of {} at {}", path.display(), guard.backup().display());
        self.state = WriteState::Verifying;
        match self.verify() {
            Ok(()) => {
                guard.commit()?;
                self.state = WriteState::Committed;
                info!("Committed metadata of {}", path.display());
                Ok(())
            }
            Err(failure) => {
                warn!("Rolling back {}: {}", path.display(), failure);
                guard.restore()?;
                self.state = WriteState::RolledBack;
                Err(Error::RoundTrip(failure))
            }
        }
    }

    fn verify(&self) -> std::result::Result<(), RoundTripFailure> {
        let reloaded = Pdf::load(self.backend, self.pdf.source_file())
            .map_err(|e| RoundTripFailure::Unparsable(e.to_string()))?;
        let fields = self.pdf.diff(&reloaded);
        if fields.is_empty() {
            Ok(())
        } else {
            Err(RoundTripFailure::Mismatch { fields })
        }
    }
}

/// Puts a backup back over its file unless committed.
///
/// Dropping an uncommitted guard restores the backup.
#[derive(Debug)]
pub struct BackupGuard {
    target: PathBuf,
    backup: PathBuf,
    armed: bool,
}

impl BackupGuard {
    pub fn new(target: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            backup: backup.into(),
            armed: true,
        }
    }

    pub fn backup(&self) -> &Path {
        &self.backup
    }

    /// Keep the new file and delete the backup. A missing backup means the
    /// backend left the file unchanged.
    pub fn commit(mut self) -> Result<()> {
        self.armed = false;
        match fs::remove_file(&self.backup) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("No backup at {}, nothing to clean up", self.backup.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the file with its backup.
    pub fn restore(mut self) -> Result<()> {
        self.armed = false;
        self.restore_backup()
    }

    fn restore_backup(&self) -> Result<()> {
        let failed = |reason: String| Error::RestoreFailed {
            path: self.target.clone(),
            reason,
        };
        if !self.backup.exists() {
            return Err(failed(format!("{} does not exist", self.backup.display())));
        }
        match fs::remove_file(&self.target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(failed(e.to_string())),
        }
        fs::rename(&self.backup, &self.target).map_err(|e| failed(e.to_string()))
    }
}

impl Drop for BackupGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.restore_backup() {
                error!("{}", e);
            }
        }
    }
}
