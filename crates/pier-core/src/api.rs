// Intended public API surface for `pier-core`.
//
// This module exists to keep the crate root small and make it explicit which
// types/functions are part of the stable interface used by the CLI and other
// crates.

pub use crate::capture::LogCapture;
pub use crate::effects::PackageManager;
pub use crate::encode::{dump_outcome, dump_output, ForeignValue, NumericArray, SandboxValue};
pub use crate::orchestrate::{InstallDriver, InstallFailure, InstallPhase};
pub use crate::prepare::{plan_dependencies, EnvPreparer};

pub use pier_domain::{
    active_file, add_extra_dependencies, missing_packages, scan_imports, script_dependencies,
    ImportNameTable, MetadataError, ModuleResolver, ResolutionOutcome, VirtualFile,
};
