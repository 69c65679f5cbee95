use serde::{Deserialize, Serialize};

/// Tagged variant over assertion kinds, per-variant payload (§9: "avoid a
/// stringly-typed registry").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssertionKind {
    Contains { text: String },
    NotContains { text: String },
    Regex { pattern: String },
    JsonSchema { schema: serde_json::Value },
    LengthBetween { min: usize, max: usize },
    ToolCalled { name: String },
    ToolNotCalled { name: String },
    RoleSequence { roles: Vec<String> },
    CustomScript { source: String },
}

impl AssertionKind {
    pub fn name(&self) -> &'static str {
        match self {
            AssertionKind::Contains { .. } => "contains",
            AssertionKind::NotContains { .. } => "not_contains",
            AssertionKind::Regex { .. } => "regex",
            AssertionKind::JsonSchema { .. } => "json_schema",
            AssertionKind::LengthBetween { .. } => "length_between",
            AssertionKind::ToolCalled { .. } => "tool_called",
            AssertionKind::ToolNotCalled { .. } => "tool_not_called",
            AssertionKind::RoleSequence { .. } => "role_sequence",
            AssertionKind::CustomScript { .. } => "custom_script",
        }
    }
}

/// An assertion attached to a turn or to the conversation as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionDef {
    pub name: String,
    pub kind: AssertionKind,
    #[serde(default)]
    pub warning: bool,
}

/// Outcome of evaluating one `AssertionDef` against recorded messages.
/// Failed iff `passed == false && warning == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionResult {
    pub name: String,
    pub passed: bool,
    pub warning: bool,
    pub kind: String,
    pub detail: String,
}

impl AssertionResult {
    pub fn is_failed(&self) -> bool {
        !self.passed && !self.warning
    }

    pub fn invalid(name: impl Into<String>, why: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            warning: false,
            kind: "invalid".to_string(),
            detail: why.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_requires_non_warning() {
        let warning = AssertionResult {
            name: "a".into(),
            passed: false,
            warning: true,
            kind: "contains".into(),
            detail: "missing".into(),
        };
        assert!(!warning.is_failed());

        let hard = AssertionResult { warning: false, ..warning };
        assert!(hard.is_failed());
    }

    #[test]
    fn invalid_helper_sets_kind() {
        let result = AssertionResult::invalid("bad", "no such field");
        assert_eq!(result.kind, "invalid");
        assert!(result.is_failed());
    }
}
