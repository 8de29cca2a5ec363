//! JSON rendering for exported records
//!
//! This module provides:
//! - Pretty-printed JSON with two-space indentation
//! - Optional color highlighting for terminal output
//! - A plain `Debug` dump used when JSON rendering fails

use colored_json::prelude::*;
use serde::Serialize;
use std::fmt::Debug;

use crate::error::SerializationError;

/// Text produced for a record set
#[derive(Debug)]
pub struct Rendered {
    /// Output text, always newline-terminated
    pub text: String,

    /// Set when JSON rendering failed and `text` holds the fallback dump
    pub degraded: Option<SerializationError>,
}

/// JSON formatter with pretty printing support
pub struct JsonFormatter {
    /// Enable colored output
    use_colors: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    ///
    /// # Arguments
    /// * `use_colors` - Colorize output (only honoured when stdout is a terminal)
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formatter that never emits color codes
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Whether this formatter may colorize its output
    pub fn use_colors(&self) -> bool {
        self.use_colors
    }

    /// Format records as an indented JSON array
    pub fn format_records<T: Serialize>(
        &self,
        records: &[T],
    ) -> std::result::Result<String, SerializationError> {
        let json_str = serde_json::to_string_pretty(records)?;

        if self.use_colors {
            Ok(json_str.to_colored_json_auto().unwrap_or(json_str))
        } else {
            Ok(json_str)
        }
    }

    /// Best-effort textual dump of records that could not be rendered as JSON
    pub fn dump_records<T: Debug>(records: &[T]) -> String {
        format!("{:?}", records)
    }

    /// Render records as JSON, degrading to [`JsonFormatter::dump_records`]
    pub fn render<T: Serialize + Debug>(&self, records: &[T]) -> Rendered {
        match self.format_records(records) {
            Ok(mut text) => {
                text.push('\n');
                Rendered {
                    text,
                    degraded: None,
                }
            }
            Err(e) => {
                let mut text = Self::dump_records(records);
                text.push('\n');
                Rendered {
                    text,
                    degraded: Some(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{OrganizationMembership, User};
    use serde::Serializer;

    #[derive(Debug)]
    struct Unserializable(&'static str);

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    fn user(external_id: &str, orgs: &[(&str, &str, &str)]) -> User {
        User {
            external_id: external_id.to_string(),
            organizations: orgs
                .iter()
                .map(|(u, o, e)| OrganizationMembership {
                    user_id: u.to_string(),
                    org_id: o.to_string(),
                    email: e.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_two_space_indent_and_trailing_newline() {
        let users = vec![user("ext-1", &[("u1", "org_123", "a@x.com")])];
        let rendered = JsonFormatter::plain().render(&users);

        assert!(rendered.degraded.is_none());
        let expected = r#"[
  {
    "external_id": "ext-1",
    "organizations": [
      {
        "userId": "u1",
        "orgId": "org_123",
        "email": "a@x.com"
      }
    ]
  }
]
"#;
        assert_eq!(rendered.text, expected);
    }

    #[test]
    fn test_empty_list_renders_empty_array() {
        let users: Vec<User> = Vec::new();
        assert_eq!(JsonFormatter::plain().render(&users).text, "[]\n");
    }

    #[test]
    fn test_round_trip() {
        let users = vec![
            user("ext-1", &[("u1", "org_123", "a@x.com")]),
            user("ext-2", &[]),
            user(
                "ext-3",
                &[("u3", "org_9", "c@y.com"), ("u3", "org_123", "c@x.com")],
            ),
        ];
        let rendered = JsonFormatter::plain().render(&users);
        let parsed: Vec<User> = serde_json::from_str(&rendered.text).unwrap();
        assert_eq!(parsed, users);
    }

    #[test]
    fn test_serialization_failure_degrades_to_dump() {
        let records = vec![Unserializable("first"), Unserializable("second")];
        let rendered = JsonFormatter::plain().render(&records);

        let err = rendered.degraded.expect("rendering should degrade");
        assert!(err.to_string().contains("refusing to serialize"));
        assert!(rendered.text.contains("Unserializable(\"first\")"));
        assert!(rendered.text.ends_with('\n'));
    }
}
