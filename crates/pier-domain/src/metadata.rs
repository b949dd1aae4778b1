//! Inline `# /// script` metadata blocks.
//!
//! A script block is a run of comment lines opened by `# /// script` and
//! closed by `# ///`; every interior line is `#` alone or `# ` followed by
//! arbitrary text. Stripping the comment prefix yields a TOML document whose
//! optional `dependencies` key declares the packages the script needs. The
//! interpreter ignores the block entirely; we parse it out here.

use serde::Deserialize;
use thiserror::Error;

const BLOCK_TYPE: &str = "script";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("multiple `{BLOCK_TYPE}` metadata blocks found")]
    DuplicateBlock,
    #[error("invalid `{BLOCK_TYPE}` metadata: {0}")]
    Malformed(String),
}

#[derive(Deserialize)]
struct RawScriptMetadata {
    dependencies: Option<Vec<String>>,
}

/// Extract the declared dependency list from an inline script block.
///
/// Returns `Ok(None)` when the source carries no block, and also when a block
/// exists but has no `dependencies` key; either way the caller falls through
/// to import scanning. A block whose `dependencies` is not an array of
/// strings, or whose body is not valid TOML, is a hard error. So is a second
/// block of the same type.
pub fn script_dependencies(source: &str) -> Result<Option<Vec<String>>, MetadataError> {
    let mut body: Option<String> = None;
    for block in script_blocks(source) {
        if body.replace(block).is_some() {
            return Err(MetadataError::DuplicateBlock);
        }
    }
    let Some(body) = body else {
        return Ok(None);
    };

    let raw: RawScriptMetadata = toml_edit::de::from_str(&body)
        .map_err(|err| MetadataError::Malformed(err.to_string()))?;
    Ok(raw.dependencies)
}

/// Collect the bodies of every well-formed `# /// script` block, comment
/// prefixes stripped. Unterminated blocks are not blocks at all.
fn script_blocks(source: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut lines = source.lines().peekable();
    while let Some(line) = lines.next() {
        let Some(block_type) = block_header(line) else {
            continue;
        };
        // Scan the comment run that follows. The block closes at the last
        // `# ///` line before the run ends, matching the greedy content
        // group in PEP 723's regex. A header line nested in the run is
        // ordinary content of the enclosing block, never a new opener.
        let mut run: Vec<&str> = Vec::new();
        while let Some(next) = lines.peek() {
            let trimmed = next.trim_end();
            if trimmed == "#" || trimmed.starts_with("# ") {
                run.push(trimmed);
                lines.next();
            } else {
                break;
            }
        }
        let Some(close) = run.iter().rposition(|line| *line == "# ///") else {
            continue;
        };
        if block_type != BLOCK_TYPE {
            continue;
        }
        let mut body = String::new();
        for line in &run[..close] {
            body.push_str(line.strip_prefix("# ").unwrap_or(&line[1..]));
            body.push('\n');
        }
        blocks.push(body);
    }
    blocks
}

/// A `# /// <type>` opener line; yields the block type name.
fn block_header(line: &str) -> Option<&str> {
    let name = line.trim_end().strip_prefix("# /// ")?;
    let valid =
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    valid.then_some(name)
}
