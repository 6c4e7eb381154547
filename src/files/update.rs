//! Two-phase file replacement: save the new file, then delete the old one.

use crate::error::GatewayResult;
use crate::files::proxy::{OwnerTag, SaveTarget, StorageLocator, UploadProxy, UploadedFile};
use crate::observability::metrics;
use crate::security::headers::RelayedHeaders;

/// What happened to the previous file after the new one was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    /// No previous file was given.
    Skipped,
    Deleted,
    /// The delete failed; the old file is orphaned in storage.
    Failed(String),
}

impl Cleanup {
    pub fn label(&self) -> &'static str {
        match self {
            Cleanup::Skipped => "skipped",
            Cleanup::Deleted => "deleted",
            Cleanup::Failed(_) => "failed",
        }
    }
}

/// Result of a successful update.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub locator: StorageLocator,
    pub cleanup: Cleanup,
}

/// Replaces stored files without ever losing the new upload.
pub struct UpdateOrchestrator<'a> {
    proxy: &'a UploadProxy,
}

impl<'a> UpdateOrchestrator<'a> {
    pub fn new(proxy: &'a UploadProxy) -> Self {
        Self { proxy }
    }

    /// Save `file`, then delete `old` if one was given.
    ///
    /// A failed save aborts before the old file is touched. A failed delete is
    /// logged and reported in [`UpdateOutcome::cleanup`] but never fails the
    /// update and never rolls back the new file.
    pub async fn update_file(
        &self,
        file: &UploadedFile,
        old: Option<&StorageLocator>,
        save: &SaveTarget,
        delete_endpoint: &str,
        headers: &RelayedHeaders,
        owner: Option<&OwnerTag>,
    ) -> GatewayResult<UpdateOutcome> {
        tracing::info!(filename = %file.filename, "Saving replacement file");
        let locator = self.proxy.save_file(file, save, headers, owner).await?;
        tracing::info!(file_path = %locator, "Replacement file saved");

        let cleanup = match old.filter(|o| !o.is_empty()) {
            None => Cleanup::Skipped,
            Some(old) => match self.proxy.delete_file(old, delete_endpoint, headers).await {
                Ok(()) => {
                    tracing::info!(file_path = %old, "Previous file deleted");
                    Cleanup::Deleted
                }
                Err(e) => {
                    tracing::warn!(
                        file_path = %old,
                        error = %e,
                        "Could not delete previous file; it is now orphaned"
                    );
                    metrics::record_orphaned_file();
                    Cleanup::Failed(e.to_string())
                }
            },
        };

        Ok(UpdateOutcome { locator, cleanup })
    }
}
