//! Field-level validation for collection records
//!
//! A [`Schema`] is an ordered list of field rules. Validation walks the rules
//! in order and stops at the first failure, so callers always get a single
//! message to show. On success the result holds only the schema's fields,
//! trimmed.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Fields;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
        .expect("email regex is valid")
});

/// Check standard address syntax
pub fn is_valid_email(s: &str) -> bool {
    !s.starts_with('.') && !s.contains("..") && EMAIL_RE.is_match(s)
}

/// Constraint on a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Trimmed text with a length range; `required` is the message for too-short input
    Text {
        min: usize,
        max: usize,
        required: &'static str,
    },
    /// Trimmed email address with a maximum length
    Email { max: usize },
    /// Value must be one of a fixed set
    OneOf {
        options: &'static [&'static str],
        message: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub label: &'static str,
    pub rule: Rule,
}

impl FieldRule {
    pub fn text(name: &'static str, label: &'static str, max: usize, required: &'static str) -> Self {
        Self {
            name,
            label,
            rule: Rule::Text {
                min: 1,
                max,
                required,
            },
        }
    }

    pub fn email(name: &'static str, label: &'static str, max: usize) -> Self {
        Self {
            name,
            label,
            rule: Rule::Email { max },
        }
    }

    pub fn one_of(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        message: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            rule: Rule::OneOf { options, message },
        }
    }

    /// Normalize one raw value, or return the failure message
    fn check(&self, raw: &str) -> Result<String, String> {
        match &self.rule {
            Rule::Text { min, max, required } => {
                let value = raw.trim();
                let len = value.chars().count();
                if len < *min {
                    return Err(required.to_string());
                }
                if len > *max {
                    return Err(too_long(self.label, *max));
                }
                Ok(value.to_string())
            }
            Rule::Email { max } => {
                let value = raw.trim();
                if !is_valid_email(value) {
                    return Err("Invalid email address".to_string());
                }
                if value.chars().count() > *max {
                    return Err(too_long(self.label, *max));
                }
                Ok(value.to_string())
            }
            Rule::OneOf { options, message } => {
                if options.contains(&raw) {
                    Ok(raw.to_string())
                } else {
                    Err(message.to_string())
                }
            }
        }
    }
}

fn too_long(label: &str, max: usize) -> String {
    format!("{label} must be at most {max} characters")
}

/// Ordered set of field rules for one record shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Names of the fields this schema accepts, in order
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name == name)
    }

    /// Validate a candidate record.
    ///
    /// Returns the normalized record (schema fields only) or the first error
    /// message. Missing fields are treated as empty strings.
    pub fn validate(&self, candidate: &Fields) -> Result<Fields, String> {
        let mut normalized = Fields::new();
        for rule in &self.rules {
            let raw = candidate.get(rule.name).map(String::as_str).unwrap_or("");
            let value = rule.check(raw)?;
            normalized.insert(rule.name.to_string(), value);
        }
        Ok(normalized)
    }

    /// A record with every schema field set to the empty string
    pub fn empty_form(&self) -> Fields {
        self.rules
            .iter()
            .map(|r| (r.name.to_string(), String::new()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fields;

    const COLORS: &[&str] = &["red", "green"];

    fn schema() -> Schema {
        Schema::new(vec![
            FieldRule::text("name", "Name", 5, "Name is required"),
            FieldRule::email("email", "Email", 20),
            FieldRule::one_of("color", "Color", COLORS, "Please select a color"),
        ])
    }

    #[test]
    fn test_validation_success_trims_and_drops_unknown() {
        let result = schema()
            .validate(&fields([
                ("name", "  Ada "),
                ("email", " ada@example.com "),
                ("color", "red"),
                ("extra", "ignored"),
            ]))
            .unwrap();
        assert_eq!(
            result,
            fields([("name", "Ada"), ("email", "ada@example.com"), ("color", "red")])
        );
    }

    #[test]
    fn test_validation_reports_first_error_in_field_order() {
        let result = schema().validate(&fields([("name", ""), ("email", "bad")]));
        assert_eq!(result, Err("Name is required".to_string()));

        let result = schema().validate(&fields([("name", "Ada"), ("email", "bad")]));
        assert_eq!(result, Err("Invalid email address".to_string()));
    }

    #[test]
    fn test_validation_whitespace_only_is_empty() {
        let result = schema().validate(&fields([("name", "   ")]));
        assert_eq!(result, Err("Name is required".to_string()));
    }

    #[test]
    fn test_validation_max_length() {
        let result = schema().validate(&fields([("name", "Adelaide")]));
        assert_eq!(
            result,
            Err("Name must be at most 5 characters".to_string())
        );

        let result = schema().validate(&fields([
            ("name", "Ada"),
            ("email", "a-very-long-address@example.com"),
        ]));
        assert_eq!(
            result,
            Err("Email must be at most 20 characters".to_string())
        );
    }

    #[test]
    fn test_validation_one_of() {
        let result = schema().validate(&fields([
            ("name", "Ada"),
            ("email", "ada@example.com"),
            ("color", "blue"),
        ]));
        assert_eq!(result, Err("Please select a color".to_string()));
    }

    #[test]
    fn test_email_syntax() {
        assert!(is_valid_email("john.doe@example.com"));
        assert!(is_valid_email("a+tag@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email(".a@example.com"));
        assert!(!is_valid_email("a..b@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_empty_form() {
        let form = schema().empty_form();
        assert_eq!(form.len(), 3);
        assert!(form.values().all(String::is_empty));
    }
}
