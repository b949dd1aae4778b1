//! Drives one installation against the sandboxed package manager.

use thiserror::Error;
use tracing::instrument::WithSubscriber;

use crate::capture::LogCapture;
use crate::effects::PackageManager;

/// Progress of one installation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    Idle,
    Installing,
    Installed,
    Failed,
}

/// Installation failed; the message carries the full captured backend log
/// followed by the error's description.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InstallFailure {
    pub message: String,
}

pub struct InstallDriver<'m, M> {
    manager: &'m M,
    phase: InstallPhase,
}

impl<'m, M: PackageManager> InstallDriver<'m, M> {
    pub fn new(manager: &'m M) -> Self {
        Self {
            manager,
            phase: InstallPhase::Idle,
        }
    }

    pub fn phase(&self) -> InstallPhase {
        self.phase
    }

    /// Install the full augmented dependency list, continuing past
    /// individual package failures.
    ///
    /// Backend diagnostics are redirected into a capture owned by this call
    /// alone; on failure they are read back in full and folded into the
    /// returned message. On success the runtime's module-resolution caches
    /// are invalidated so freshly installed modules are found.
    pub async fn install(&mut self, specs: &[String]) -> Result<(), InstallFailure> {
        let capture = LogCapture::new();
        self.phase = InstallPhase::Installing;
        let result = self
            .manager
            .install(specs, true)
            .with_subscriber(capture.dispatch())
            .await;
        match result {
            Ok(()) => {
                self.manager.invalidate_caches();
                self.phase = InstallPhase::Installed;
                Ok(())
            }
            Err(err) => {
                self.phase = InstallPhase::Failed;
                let logs = capture.contents();
                Err(InstallFailure {
                    message: format!("{logs} {err:?}"),
                })
            }
        }
    }
}
