//! Import-name to package-name resolution.

use indexmap::IndexMap;

/// Module-resolution facility of the target runtime: can this module be
/// imported as things stand today?
pub trait ModuleResolver {
    fn attempt_import(&self, module: &str) -> bool;
}

impl<R: ModuleResolver + ?Sized> ModuleResolver for &R {
    fn attempt_import(&self, module: &str) -> bool {
        (**self).attempt_import(module)
    }
}

impl<R: ModuleResolver + ?Sized> ModuleResolver for Box<R> {
    fn attempt_import(&self, module: &str) -> bool {
        (**self).attempt_import(module)
    }
}

/// Read-only mapping from importable module name to installable package
/// name, loaded once at process start from the sandbox runtime's metadata.
#[derive(Debug, Clone, Default)]
pub struct ImportNameTable {
    entries: IndexMap<String, String>,
}

impl ImportNameTable {
    pub fn new(entries: IndexMap<String, String>) -> Self {
        Self { entries }
    }

    /// Load the table from a JSON object of `module-name: package-name`
    /// pairs, the shape the runtime metadata exposes.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let entries: IndexMap<String, String> = serde_json::from_str(raw)?;
        Ok(Self { entries })
    }

    pub fn package_for(&self, module: &str) -> Option<&str> {
        self.entries.get(module).map(String::as_str)
    }
}

/// Given the modules an active file imports, return the packages that are
/// genuinely missing, scan order preserved.
///
/// A module that already imports is satisfied and excluded. Otherwise the
/// name table decides; when it is silent, `guess_package_name` has the last
/// word.
pub fn missing_packages(
    modules: &[String],
    resolver: &dyn ModuleResolver,
    table: &ImportNameTable,
) -> Vec<String> {
    let mut packages = Vec::new();
    for module in modules {
        if resolver.attempt_import(module) {
            continue;
        }
        if let Some(package) = table.package_for(module) {
            packages.push(package.to_string());
        } else if let Some(package) = guess_package_name(module) {
            packages.push(package.to_string());
        } else {
            tracing::debug!(module = %module, "no package mapping; skipping");
        }
    }
    packages
}

/// Best-effort heuristic: an undotted module probably ships in a package of
/// the same name, while a dotted submodule of an unknown package gives no
/// reliable parent to guess. False negatives are accepted over requesting
/// packages that do not exist.
fn guess_package_name(module: &str) -> Option<&str> {
    if module.contains('.') {
        None
    } else {
        Some(module)
    }
}
