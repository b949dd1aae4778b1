#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod augment;
pub mod file;
pub mod imports;
pub mod metadata;
pub mod outcome;
pub mod resolve;

pub use augment::{add_extra_dependencies, MAX_EXTRA_DEPENDENCIES};
pub use file::{active_file, VirtualFile};
pub use imports::scan_imports;
pub use metadata::{script_dependencies, MetadataError};
pub use outcome::ResolutionOutcome;
pub use resolve::{missing_packages, ImportNameTable, ModuleResolver};
