//! Companion packages for installers with incomplete transitive metadata.
//!
//! Some sandbox installers skip transitive dependencies they cannot see in
//! wheel metadata. The rule table below patches the known holes: pygments
//! makes rich (and logfire's console output) render, ssl backs fastapi and
//! httpx, and pydantic_ai needs a current typing_extensions.

/// Hard cap on appended extras per invocation, so the pass stays bounded as
/// the rule table grows.
pub const MAX_EXTRA_DEPENDENCIES: usize = 3;

/// Append known companion packages to a resolved dependency list.
///
/// Rules match on requirement-name prefixes, extras land at the end, and
/// duplicates are left for the installer to tolerate. The original entries
/// and their order are untouched.
pub fn add_extra_dependencies(dependencies: Vec<String>) -> Vec<String> {
    let mut extras: Vec<String> = Vec::new();
    for dep in &dependencies {
        if dep.starts_with("logfire") || dep.starts_with("rich") {
            extras.push("pygments".to_string());
        } else if dep.starts_with("fastapi") || dep.starts_with("httpx") {
            extras.push("ssl".to_string());
        }

        if dep.starts_with("pydantic_ai") {
            extras.push("typing_extensions>=4.12".to_string());
        }

        if extras.len() >= MAX_EXTRA_DEPENDENCIES {
            break;
        }
    }

    let mut augmented = dependencies;
    augmented.extend(extras);
    augmented
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn unmatched_lists_pass_through() {
        assert_eq!(
            add_extra_dependencies(deps(&["numpy", "pandas"])),
            deps(&["numpy", "pandas"])
        );
    }

    #[test]
    fn rich_gains_pygments() {
        assert_eq!(
            add_extra_dependencies(deps(&["rich>=13"])),
            deps(&["rich>=13", "pygments"])
        );
    }

    #[test]
    fn pydantic_ai_gains_typing_extensions() {
        assert_eq!(
            add_extra_dependencies(deps(&["pydantic_ai"])),
            deps(&["pydantic_ai", "typing_extensions>=4.12"])
        );
    }

    #[test]
    fn httpx_gains_ssl() {
        assert_eq!(
            add_extra_dependencies(deps(&["httpx"])),
            deps(&["httpx", "ssl"])
        );
    }

    #[test]
    fn extras_are_capped() {
        let augmented = add_extra_dependencies(deps(&["rich", "logfire", "httpx", "fastapi"]));
        assert_eq!(
            augmented,
            deps(&["rich", "logfire", "httpx", "fastapi", "pygments", "pygments", "ssl"])
        );
    }

    #[test]
    fn duplicates_are_permitted() {
        let augmented = add_extra_dependencies(deps(&["rich", "pygments"]));
        assert_eq!(augmented, deps(&["rich", "pygments", "pygments"]));
    }
}
