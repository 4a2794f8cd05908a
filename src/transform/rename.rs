// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field path renaming rules.
//!
//! Rules rewrite decoded field paths before they become series keys. They
//! are checked in order and the first match wins. Two paths renamed to the
//! same target share one series.

use std::borrow::Cow;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::TransformError;

/// One rule as written in a rules file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Only apply to channels of this message type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Wildcard pattern over the full field path (`*` matches anything)
    pub pattern: String,
    /// Replacement; each `*` takes the next captured wildcard
    pub replacement: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RuleFile {
    #[serde(default, rename = "rule")]
    rules: Vec<RuleSpec>,
}

/// A compiled wildcard rule.
#[derive(Debug, Clone)]
struct RenameRule {
    type_name: Option<String>,
    /// Anchored regex, e.g. `^pose\.(.*)$`
    pattern: Regex,
    /// Target with `${groupN}` placeholders
    target_template: String,
}

impl RenameRule {
    fn compile(spec: &RuleSpec) -> Result<Self, TransformError> {
        let captures = spec.pattern.matches('*').count();
        let used = spec.replacement.matches('*').count();
        if used > captures {
            return Err(TransformError::InvalidRule {
                rule: spec.pattern.clone(),
                reason: format!(
                    "replacement uses {used} wildcards but the pattern captures {captures}"
                ),
            });
        }

        let mut regex_pattern = String::from("^");
        for c in spec.pattern.chars() {
            match c {
                '*' => regex_pattern.push_str("(.*)"),
                _ => {
                    let mut buf = [0u8; 4];
                    regex_pattern.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                }
            }
        }
        regex_pattern.push('$');

        let mut target_template = String::new();
        let mut group_idx = 0;
        for c in spec.replacement.chars() {
            if c == '*' {
                group_idx += 1;
                target_template.push_str(&format!("${{group{group_idx}}}"));
            } else {
                target_template.push(c);
            }
        }

        let pattern = Regex::new(&regex_pattern).map_err(|e| TransformError::InvalidRule {
            rule: spec.pattern.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            type_name: spec.type_name.clone(),
            pattern,
            target_template,
        })
    }

    fn applies_to(&self, type_name: Option<&str>) -> bool {
        match (&self.type_name, type_name) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted == actual,
            (Some(_), None) => false,
        }
    }

    fn apply(&self, path: &str) -> Option<String> {
        self.pattern.captures(path).map(|caps| {
            let mut result = self.target_template.clone();
            for i in 1..caps.len() {
                let placeholder = format!("${{group{i}}}");
                if let Some(captured) = caps.get(i) {
                    result = result.replace(&placeholder, captured.as_str());
                }
            }
            result
        })
    }
}

/// Ordered set of renaming rules.
///
/// # Example
///
/// ```
/// use bagseries::transform::RenameRules;
///
/// let mut rules = RenameRules::new();
/// rules.add_rule("pose.pose.*", "pose.*").unwrap();
/// assert_eq!(rules.apply("pose.pose.position.x"), "pose.position.x");
/// assert_eq!(rules.apply("twist.linear.x"), "twist.linear.x");
/// ```
#[derive(Debug, Clone)]
pub struct RenameRules {
    rules: Vec<RenameRule>,
    enabled: bool,
}

impl Default for RenameRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RenameRules {
    /// Create an empty, enabled rule set.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            enabled: true,
        }
    }

    /// Compile a list of rule specs, preserving order.
    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self, TransformError> {
        let rules = specs
            .iter()
            .map(RenameRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            rules,
            enabled: true,
        })
    }

    /// Parse a TOML rules document (`[[rule]]` tables).
    pub fn from_toml_str(text: &str) -> Result<Self, TransformError> {
        let file: RuleFile = toml::from_str(text).map_err(|e| TransformError::Format {
            message: e.to_string(),
        })?;
        Self::from_specs(&file.rules)
    }

    /// Load a TOML rules file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TransformError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| TransformError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Append a rule that applies to every channel.
    pub fn add_rule(
        &mut self,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<(), TransformError> {
        self.add_spec(&RuleSpec {
            type_name: None,
            pattern: pattern.into(),
            replacement: replacement.into(),
        })
    }

    /// Append a rule.
    pub fn add_spec(&mut self, spec: &RuleSpec) -> Result<(), TransformError> {
        self.rules.push(RenameRule::compile(spec)?);
        Ok(())
    }

    /// Turn rule application on or off. Disabled rules pass every path through.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Builder form of [`set_enabled`](Self::set_enabled).
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether rules are applied.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rename a path using only the rules not scoped to a message type.
    pub fn apply<'a>(&self, path: &'a str) -> Cow<'a, str> {
        self.apply_scoped(None, path)
    }

    /// Rename a path decoded from a message of type `type_name`.
    pub fn apply_for<'a>(&self, type_name: &str, path: &'a str) -> Cow<'a, str> {
        self.apply_scoped(Some(type_name), path)
    }

    fn apply_scoped<'a>(&self, type_name: Option<&str>, path: &'a str) -> Cow<'a, str> {
        if !self.enabled {
            return Cow::Borrowed(path);
        }
        self.rules
            .iter()
            .filter(|rule| rule.applies_to(type_name))
            .find_map(|rule| rule.apply(path))
            .map_or(Cow::Borrowed(path), Cow::Owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_rule() {
        let mut rules = RenameRules::new();
        rules.add_rule("a.b", "merged").unwrap();

        assert_eq!(rules.apply("a.b"), "merged");
        assert_eq!(rules.apply("a.bc"), "a.bc");
        assert!(matches!(rules.apply("x.y"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_special_characters_are_literal() {
        let mut rules = RenameRules::new();
        rules.add_rule("data[0]", "first").unwrap();

        assert_eq!(rules.apply("data[0]"), "first");
        assert_eq!(rules.apply("data0"), "data0");
    }

    #[test]
    fn test_wildcards_capture() {
        let mut rules = RenameRules::new();
        rules
            .add_rule("transforms[*].transform.*", "tf.*.*")
            .unwrap();

        assert_eq!(
            rules.apply("transforms[2].transform.translation.x"),
            "tf.2.translation.x"
        );
    }

    #[test]
    fn test_replacement_wildcards_must_be_captured() {
        let mut rules = RenameRules::new();
        let err = rules.add_rule("a.*", "*.*").unwrap_err();
        assert!(matches!(err, TransformError::InvalidRule { .. }));
        assert!(rules.is_empty());

        rules.add_rule("a.*", "x.*").unwrap();
        rules.add_rule("a.*.*", "*").unwrap();
        assert_eq!(rules.apply("a.b"), "x.b");
    }

    #[test]
    fn test_first_match_wins() {
        let mut rules = RenameRules::new();
        rules.add_rule("pose.*", "first.*").unwrap();
        rules.add_rule("pose.x", "second").unwrap();

        assert_eq!(rules.apply("pose.x"), "first.x");
    }

    #[test]
    fn test_disabled_passes_through() {
        let mut rules = RenameRules::new();
        rules.add_rule("a.b", "merged").unwrap();
        rules.set_enabled(false);

        assert_eq!(rules.apply("a.b"), "a.b");
        assert!(!rules.is_enabled());
    }

    #[test]
    fn test_type_scoped_rules() {
        let rules = RenameRules::from_specs(&[RuleSpec {
            type_name: Some("nav_msgs/Odometry".to_string()),
            pattern: "pose.pose.*".to_string(),
            replacement: "pose.*".to_string(),
        }])
        .unwrap();

        assert_eq!(
            rules.apply_for("nav_msgs/Odometry", "pose.pose.position.x"),
            "pose.position.x"
        );
        assert_eq!(
            rules.apply_for("other/Type", "pose.pose.position.x"),
            "pose.pose.position.x"
        );
        assert_eq!(rules.apply("pose.pose.position.x"), "pose.pose.position.x");
    }

    #[test]
    fn test_from_toml() {
        let text = r#"
[[rule]]
pattern = "a.b"
replacement = "merged"

[[rule]]
type_name = "geometry_msgs/Twist"
pattern = "linear.*"
replacement = "v.*"
"#;
        let rules = RenameRules::from_toml_str(text).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.apply_for("geometry_msgs/Twist", "linear.x"), "v.x");
    }

    #[test]
    fn test_from_toml_rejects_bad_document() {
        let err = RenameRules::from_toml_str("[[rule]]\npattern = 3").unwrap_err();
        assert!(matches!(err, TransformError::Format { .. }));
    }

    #[test]
    fn test_from_missing_file() {
        let err = RenameRules::from_file("/nonexistent/rules.toml").unwrap_err();
        assert!(matches!(err, TransformError::Io { .. }));
    }
}
