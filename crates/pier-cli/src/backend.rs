//! Host-interpreter backends for the collaborator traits.

use std::process::Command;

use anyhow::{bail, Context, Result};
use pier_core::{ModuleResolver, PackageManager};
use tokio::process::Command as AsyncCommand;

const PROBE_SNIPPET: &str = "\
import importlib.util, sys
try:
    found = importlib.util.find_spec(sys.argv[1]) is not None
except Exception:
    found = False
sys.exit(0 if found else 1)
";

/// Installs packages by driving `pip` in the configured interpreter.
///
/// pip aborts its whole invocation on the first requirement it cannot
/// satisfy, so keep-going batches run one requirement per invocation and
/// collect the stragglers. Every output line is re-emitted as a `tracing`
/// event for the orchestrator's capture.
pub struct PipPackageManager {
    python: String,
}

impl PipPackageManager {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    async fn install_one(&self, spec: &str) -> Result<bool> {
        let output = AsyncCommand::new(&self.python)
            .args([
                "-m",
                "pip",
                "install",
                "--disable-pip-version-check",
                "--no-input",
                spec,
            ])
            .output()
            .await
            .with_context(|| format!("failed to run {} -m pip", self.python))?;
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            tracing::info!("{line}");
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            tracing::info!("{line}");
        }
        Ok(output.status.success())
    }
}

impl PackageManager for PipPackageManager {
    async fn install(&self, specs: &[String], keep_going: bool) -> Result<()> {
        let mut failed: Vec<&str> = Vec::new();
        for spec in specs {
            if !self.install_one(spec).await? {
                if !keep_going {
                    bail!("failed to install {spec}");
                }
                failed.push(spec);
            }
        }
        if !failed.is_empty() {
            bail!("failed to install: {}", failed.join(", "));
        }
        Ok(())
    }

    fn invalidate_caches(&self) {
        // Every probe and run spawns a fresh interpreter; there is no
        // in-process import cache to flush.
    }
}

/// Asks the configured interpreter whether a module can be imported today.
pub struct PythonProbe {
    python: String,
}

impl PythonProbe {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }
}

impl ModuleResolver for PythonProbe {
    fn attempt_import(&self, module: &str) -> bool {
        Command::new(&self.python)
            .args(["-c", PROBE_SNIPPET, module])
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// Treats every module as missing; used when no interpreter should be
/// consulted.
pub struct AssumeMissing;

impl ModuleResolver for AssumeMissing {
    fn attempt_import(&self, _module: &str) -> bool {
        false
    }
}
