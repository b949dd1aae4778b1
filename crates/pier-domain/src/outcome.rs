use serde::{Deserialize, Serialize};

/// Final result of one resolution-plus-install call, as shipped across the
/// wire to the caller.
///
/// `dependencies: None` means no active file or nothing to install; an
/// installer failure collapses into a single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Success { dependencies: Option<Vec<String>> },
    Error { message: String },
}

impl ResolutionOutcome {
    pub fn success(dependencies: Option<Vec<String>>) -> Self {
        Self::Success { dependencies }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_serializes_with_a_kind_tag() {
        let outcome = ResolutionOutcome::success(Some(vec!["requests".to_string()]));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "success");
        assert_eq!(json["dependencies"][0], "requests");
    }

    #[test]
    fn error_round_trips() {
        let outcome = ResolutionOutcome::error("boom");
        let json = serde_json::to_string(&outcome).unwrap();
        let back: ResolutionOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }

    #[test]
    fn null_dependencies_survive_the_wire() {
        let json = r#"{"kind": "success", "dependencies": null}"#;
        let outcome: ResolutionOutcome = serde_json::from_str(json).unwrap();
        assert_eq!(outcome, ResolutionOutcome::success(None));
    }
}
