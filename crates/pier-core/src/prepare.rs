//! Entry point: materialize a file batch, resolve its dependencies, and
//! drive installation.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use pier_domain::{
    active_file, add_extra_dependencies, missing_packages, scan_imports, script_dependencies,
    ImportNameTable, MetadataError, ModuleResolver, ResolutionOutcome, VirtualFile,
};

use crate::effects::PackageManager;
use crate::orchestrate::InstallDriver;

/// Decide what the active file needs installed.
///
/// Declared metadata is authoritative: when a script block yields a list the
/// import scanner never runs. Otherwise scanned imports are filtered down to
/// genuinely missing packages. A non-empty list gains the known companion
/// packages; `None` means no list could be determined (no block, and the
/// source was unscannable).
pub fn plan_dependencies(
    source: &str,
    resolver: &dyn ModuleResolver,
    table: &ImportNameTable,
) -> Result<Option<Vec<String>>, MetadataError> {
    let declared = script_dependencies(source)?;
    let found = match declared {
        Some(dependencies) => Some(dependencies),
        None => scan_imports(source).map(|modules| missing_packages(&modules, resolver, table)),
    };
    Ok(found.map(|dependencies| {
        if dependencies.is_empty() {
            dependencies
        } else {
            add_extra_dependencies(dependencies)
        }
    }))
}

/// Prepares the sandbox working directory for one run: writes the batch to
/// disk, resolves the active file's dependencies, and installs them.
///
/// Collaborators are injected at construction and live for the process; the
/// preparer itself holds no mutable state between calls.
pub struct EnvPreparer<M, R> {
    manager: M,
    modules: R,
    table: ImportNameTable,
    workdir: PathBuf,
}

impl<M: PackageManager, R: ModuleResolver> EnvPreparer<M, R> {
    pub fn new(manager: M, modules: R, table: ImportNameTable, workdir: impl Into<PathBuf>) -> Self {
        Self {
            manager,
            modules,
            table,
            workdir: workdir.into(),
        }
    }

    /// Run one resolution-plus-install call over a file batch.
    ///
    /// Metadata errors propagate and terminate the call; only installation
    /// failures are recovered into the `Error` outcome, carrying the full
    /// captured installer log plus the error text.
    pub async fn prepare(&self, files: &[VirtualFile]) -> Result<ResolutionOutcome> {
        self.materialize(files)?;

        let Some(active) = active_file(files) else {
            return Ok(ResolutionOutcome::success(None));
        };

        let dependencies = plan_dependencies(&active.content, &self.modules, &self.table)?;

        if let Some(specs) = dependencies.as_deref().filter(|specs| !specs.is_empty()) {
            tracing::debug!(count = specs.len(), "installing resolved dependencies");
            let mut driver = InstallDriver::new(&self.manager);
            if let Err(failure) = driver.install(specs).await {
                return Ok(ResolutionOutcome::error(failure.message));
            }
        }

        Ok(ResolutionOutcome::success(dependencies))
    }

    /// Write every file into the working directory. Write-once, no
    /// atomicity across files.
    fn materialize(&self, files: &[VirtualFile]) -> Result<()> {
        fs::create_dir_all(&self.workdir)
            .with_context(|| format!("failed to create {}", self.workdir.display()))?;
        for file in files {
            let path = self.workdir.join(&file.name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&path, &file.content)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeManager {
        calls: Mutex<Vec<Vec<String>>>,
        fail_with: Option<&'static str>,
    }

    impl PackageManager for FakeManager {
        async fn install(&self, specs: &[String], _keep_going: bool) -> Result<()> {
            self.calls.lock().unwrap().push(specs.to_vec());
            tracing::info!("resolving wheels");
            if let Some(message) = self.fail_with {
                bail!("{message}");
            }
            Ok(())
        }

        fn invalidate_caches(&self) {}
    }

    struct Installed(HashSet<&'static str>);

    impl ModuleResolver for Installed {
        fn attempt_import(&self, module: &str) -> bool {
            self.0.contains(module)
        }
    }

    fn preparer<'m>(
        manager: &'m FakeManager,
        installed: &[&'static str],
    ) -> EnvPreparer<&'m FakeManager, Installed> {
        let workdir = tempfile::tempdir().unwrap().keep();
        EnvPreparer::new(
            manager,
            Installed(installed.iter().copied().collect()),
            ImportNameTable::default(),
            workdir,
        )
    }

    fn batch(content: &str) -> Vec<VirtualFile> {
        vec![
            VirtualFile::new("helper.py", "x = 1", false),
            VirtualFile::new("main.py", content, true),
        ]
    }

    #[tokio::test]
    async fn missing_import_is_proposed_and_installed() {
        let manager = FakeManager::default();
        let env = preparer(&manager, &[]);

        let outcome = env.prepare(&batch("import requests")).await.unwrap();

        assert_eq!(
            outcome,
            ResolutionOutcome::success(Some(vec!["requests".to_string()]))
        );
        assert_eq!(
            manager.calls.lock().unwrap()[0],
            vec!["requests".to_string()]
        );
    }

    #[tokio::test]
    async fn declared_metadata_short_circuits_the_scanner() {
        let manager = FakeManager::default();
        let env = preparer(&manager, &[]);
        let content = "# /// script\n# dependencies = [\"pydantic_ai\"]\n# ///\nimport numpy\n";

        let outcome = env.prepare(&batch(content)).await.unwrap();

        // The scanner never saw `numpy`; the augmenter appended the known
        // companion of pydantic_ai.
        let expected = vec![
            "pydantic_ai".to_string(),
            "typing_extensions>=4.12".to_string(),
        ];
        assert_eq!(outcome, ResolutionOutcome::success(Some(expected.clone())));
        assert_eq!(manager.calls.lock().unwrap()[0], expected);
    }

    #[tokio::test]
    async fn no_active_file_skips_resolution_entirely() {
        let manager = FakeManager::default();
        let env = preparer(&manager, &[]);
        let files = vec![VirtualFile::new("lib.py", "import requests", false)];

        let outcome = env.prepare(&files).await.unwrap();

        assert_eq!(outcome, ResolutionOutcome::success(None));
        assert!(manager.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unscannable_source_skips_installation() {
        let manager = FakeManager::default();
        let env = preparer(&manager, &[]);

        let outcome = env.prepare(&batch("x = 'unterminated\n")).await.unwrap();

        assert_eq!(outcome, ResolutionOutcome::success(None));
        assert!(manager.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn satisfied_imports_install_nothing() {
        let manager = FakeManager::default();
        let env = preparer(&manager, &["json"]);

        let outcome = env.prepare(&batch("import json")).await.unwrap();

        assert_eq!(outcome, ResolutionOutcome::success(Some(vec![])));
        assert!(manager.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn installer_failure_becomes_an_error_outcome() {
        let manager = FakeManager {
            fail_with: Some("download refused"),
            ..FakeManager::default()
        };
        let env = preparer(&manager, &[]);

        let outcome = env.prepare(&batch("import requests")).await.unwrap();

        let ResolutionOutcome::Error { message } = outcome else {
            panic!("expected an error outcome");
        };
        assert!(message.contains("resolving wheels"));
        assert!(message.contains("download refused"));
    }

    #[tokio::test]
    async fn duplicate_metadata_blocks_abort_the_call() {
        let manager = FakeManager::default();
        let env = preparer(&manager, &[]);
        let block = "# /// script\n# dependencies = []\n# ///\n";
        let content = format!("{block}\n{block}");

        let err = env.prepare(&batch(&content)).await.unwrap_err();

        assert!(err.downcast_ref::<MetadataError>().is_some());
        assert!(manager.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn files_are_materialized_before_resolution() {
        let manager = FakeManager::default();
        let workdir = tempfile::tempdir().unwrap();
        let env = EnvPreparer::new(
            &manager,
            Installed(HashSet::new()),
            ImportNameTable::default(),
            workdir.path(),
        );

        env.prepare(&batch("x = 1")).await.unwrap();

        assert_eq!(
            fs::read_to_string(workdir.path().join("helper.py")).unwrap(),
            "x = 1"
        );
        assert!(workdir.path().join("main.py").exists());
    }
}
