use arena_types::{AssertionDef, AssertionKind, AssertionResult, Message, Role};
use regex::Regex;

/// Evaluates turn-level and conversation-level assertions over recorded
/// messages. Every predicate is a pure function of its inputs: no I/O, no
/// randomness, and it never panics — malformed definitions surface as a
/// failing result with `kind="invalid"` instead (spec §4.3).
pub struct AssertionEngine;

impl AssertionEngine {
    pub fn evaluate(def: &AssertionDef, messages: &[Message]) -> AssertionResult {
        let outcome = match &def.kind {
            AssertionKind::Contains { text } => Self::contains(messages, text),
            AssertionKind::NotContains { text } => Self::not_contains(messages, text),
            AssertionKind::Regex { pattern } => Self::regex(messages, pattern),
            AssertionKind::JsonSchema { schema } => Self::json_schema(messages, schema),
            AssertionKind::LengthBetween { min, max } => Self::length_between(messages, *min, *max),
            AssertionKind::ToolCalled { name } => Self::tool_called(messages, name),
            AssertionKind::ToolNotCalled { name } => Self::tool_not_called(messages, name),
            AssertionKind::RoleSequence { roles } => Self::role_sequence(messages, roles),
            AssertionKind::CustomScript { source } => Self::custom_script(messages, source),
        };

        match outcome {
            Ok((passed, detail)) => AssertionResult {
                name: def.name.clone(),
                passed,
                warning: def.warning,
                kind: def.kind.name().to_string(),
                detail,
            },
            Err(why) => AssertionResult::invalid(&def.name, why),
        }
    }

    fn contains(messages: &[Message], text: &str) -> Result<(bool, String), String> {
        let found = messages.iter().any(|m| m.content.contains(text));
        Ok((found, format!("looked for {text:?} in {} message(s)", messages.len())))
    }

    fn not_contains(messages: &[Message], text: &str) -> Result<(bool, String), String> {
        let found = messages.iter().any(|m| m.content.contains(text));
        Ok((!found, format!("forbade {text:?} in {} message(s)", messages.len())))
    }

    fn regex(messages: &[Message], pattern: &str) -> Result<(bool, String), String> {
        let re = Regex::new(pattern).map_err(|e| format!("invalid regex {pattern:?}: {e}"))?;
        let matched = messages.iter().any(|m| re.is_match(&m.content));
        Ok((matched, format!("pattern {pattern:?} against {} message(s)", messages.len())))
    }

    fn json_schema(messages: &[Message], schema: &serde_json::Value) -> Result<(bool, String), String> {
        let required = schema
            .get("required")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect::<Vec<_>>())
            .unwrap_or_default();

        let last = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .ok_or_else(|| "json_schema assertion requires at least one assistant message".to_string())?;

        let value: serde_json::Value = serde_json::from_str(&last.content)
            .map_err(|e| format!("assistant content is not valid JSON: {e}"))?;

        let missing: Vec<&str> = required
            .iter()
            .filter(|field| value.get(field).is_none())
            .copied()
            .collect();

        if missing.is_empty() {
            Ok((true, "all required fields present".to_string()))
        } else {
            Ok((false, format!("missing fields: {}", missing.join(", "))))
        }
    }

    fn length_between(messages: &[Message], min: usize, max: usize) -> Result<(bool, String), String> {
        if min > max {
            return Err(format!("length_between has min ({min}) greater than max ({max})"));
        }
        let last = messages
            .last()
            .ok_or_else(|| "length_between assertion requires at least one message".to_string())?;
        let len = last.content.chars().count();
        Ok((len >= min && len <= max, format!("length {len} against [{min}, {max}]")))
    }

    fn tool_called(messages: &[Message], name: &str) -> Result<(bool, String), String> {
        let called = messages.iter().any(|m| m.tool_calls.iter().any(|c| c.name == name));
        Ok((called, format!("tool {name:?} called: {called}")))
    }

    fn tool_not_called(messages: &[Message], name: &str) -> Result<(bool, String), String> {
        let called = messages.iter().any(|m| m.tool_calls.iter().any(|c| c.name == name));
        Ok((!called, format!("tool {name:?} called: {called}")))
    }

    fn role_sequence(messages: &[Message], expected: &[String]) -> Result<(bool, String), String> {
        let actual: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        let matches = actual.len() == expected.len()
            && actual.iter().zip(expected.iter()).all(|(a, e)| *a == e.as_str());
        Ok((matches, format!("actual {actual:?} vs expected {expected:?}")))
    }

    /// A `custom_script` is a newline-separated list of clauses, each one
    /// of the other predicates spelled as `verb "argument"` (e.g.
    /// `contains "hello"`), ANDed together. This is deliberately not a
    /// general-purpose scripting language — it lets a scenario author
    /// combine two or three existing checks into one named assertion
    /// without reaching for an embedded interpreter.
    fn custom_script(messages: &[Message], source: &str) -> Result<(bool, String), String> {
        let clauses: Vec<&str> = source.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
        if clauses.is_empty() {
            return Err("custom_script source has no clauses".to_string());
        }

        for clause in &clauses {
            let (verb, arg) = Self::parse_clause(clause)?;
            let (passed, detail) = match verb {
                "contains" => Self::contains(messages, arg)?,
                "not_contains" => Self::not_contains(messages, arg)?,
                "regex" => Self::regex(messages, arg)?,
                other => return Err(format!("unknown custom_script verb {other:?} in clause {clause:?}")),
            };
            if !passed {
                return Ok((false, format!("clause {clause:?} failed: {detail}")));
            }
        }

        Ok((true, format!("{} clause(s) all passed", clauses.len())))
    }

    fn parse_clause(clause: &str) -> Result<(&str, &str), String> {
        let (verb, rest) = clause
            .split_once(' ')
            .ok_or_else(|| format!("malformed custom_script clause {clause:?}: expected 'verb \"argument\"'"))?;
        let arg = rest
            .trim()
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .ok_or_else(|| format!("custom_script clause argument must be quoted: {clause:?}"))?;
        Ok((verb, arg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn msg(role: Role, content: &str) -> Message {
        Message::new(role, content, Utc::now())
    }

    fn def(kind: AssertionKind) -> AssertionDef {
        AssertionDef { name: "t".into(), kind, warning: false }
    }

    #[test]
    fn contains_passes_when_text_present() {
        let messages = vec![msg(Role::Assistant, "hello world")];
        let result = AssertionEngine::evaluate(&def(AssertionKind::Contains { text: "hello".into() }), &messages);
        assert!(result.passed);
    }

    #[test]
    fn not_contains_fails_when_text_present() {
        let messages = vec![msg(Role::Assistant, "hello world")];
        let result =
            AssertionEngine::evaluate(&def(AssertionKind::NotContains { text: "hello".into() }), &messages);
        assert!(!result.passed);
        assert!(result.is_failed());
    }

    #[test]
    fn warning_failure_is_not_a_hard_failure() {
        let messages = vec![msg(Role::Assistant, "hello world")];
        let mut assertion = def(AssertionKind::NotContains { text: "hello".into() });
        assertion.warning = true;
        let result = AssertionEngine::evaluate(&assertion, &messages);
        assert!(!result.passed);
        assert!(!result.is_failed());
    }

    #[test]
    fn malformed_regex_surfaces_as_invalid_not_a_panic() {
        let messages = vec![msg(Role::Assistant, "x")];
        let result = AssertionEngine::evaluate(&def(AssertionKind::Regex { pattern: "(".into() }), &messages);
        assert_eq!(result.kind, "invalid");
        assert!(result.is_failed());
    }

    #[test]
    fn role_sequence_matches_exact_order() {
        let messages = vec![msg(Role::User, "a"), msg(Role::Assistant, "b")];
        let result = AssertionEngine::evaluate(
            &def(AssertionKind::RoleSequence { roles: vec!["user".into(), "assistant".into()] }),
            &messages,
        );
        assert!(result.passed);
    }

    #[test]
    fn tool_called_detects_recorded_tool_call() {
        use arena_types::ToolCall;
        let mut m = msg(Role::Assistant, "");
        m.tool_calls.push(ToolCall { id: "1".into(), name: "search".into(), arguments: serde_json::Value::Null });
        let result = AssertionEngine::evaluate(&def(AssertionKind::ToolCalled { name: "search".into() }), &[m]);
        assert!(result.passed);
    }

    #[test]
    fn length_between_rejects_inverted_bounds_as_invalid() {
        let messages = vec![msg(Role::Assistant, "hi")];
        let result =
            AssertionEngine::evaluate(&def(AssertionKind::LengthBetween { min: 10, max: 2 }), &messages);
        assert_eq!(result.kind, "invalid");
    }

    #[test]
    fn custom_script_ands_its_clauses() {
        let messages = vec![msg(Role::Assistant, "hello world")];
        let source = "contains \"hello\"\nnot_contains \"sorry\"".to_string();
        let result = AssertionEngine::evaluate(&def(AssertionKind::CustomScript { source }), &messages);
        assert!(result.passed);
    }

    #[test]
    fn custom_script_fails_on_first_failing_clause() {
        let messages = vec![msg(Role::Assistant, "hello world")];
        let source = "contains \"hello\"\nnot_contains \"world\"".to_string();
        let result = AssertionEngine::evaluate(&def(AssertionKind::CustomScript { source }), &messages);
        assert!(!result.passed);
        assert!(result.is_failed());
    }

    #[test]
    fn custom_script_with_malformed_clause_is_invalid() {
        let messages = vec![msg(Role::Assistant, "hi")];
        let result = AssertionEngine::evaluate(
            &def(AssertionKind::CustomScript { source: "return true".into() }),
            &messages,
        );
        assert_eq!(result.kind, "invalid");
    }
}
