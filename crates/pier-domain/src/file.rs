use serde::{Deserialize, Serialize};

/// One in-memory source file destined for the sandbox working directory.
///
/// At most one file in a batch carries `active = true`; only that file's
/// content drives dependency resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualFile {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub active: bool,
}

impl VirtualFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>, active: bool) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            active,
        }
    }
}

/// The first file marked active, if any.
pub fn active_file(files: &[VirtualFile]) -> Option<&VirtualFile> {
    files.iter().find(|file| file.active)
}
