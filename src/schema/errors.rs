//! Validation error records and their plain-text rendering
//!
//! An error list renders to nothing when it is absent or empty, and to one
//! line per error otherwise:
//!
//! ```text
//! <keyword> error: <message>. Schema: <params as compact JSON>
//! ```

use console::style;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single JSON-schema rule violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Schema keyword that failed (`required`, `type`, ...)
    pub keyword: String,

    /// Human-readable description of the violation
    pub message: String,

    /// Keyword-specific details
    #[serde(default)]
    pub params: Map<String, Value>,

    /// JSON pointer to the offending value, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_path: Option<String>,
}

impl ValidationError {
    pub fn new(keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            message: message.into(),
            params: Map::new(),
            instance_path: None,
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn with_instance_path(mut self, path: impl Into<String>) -> Self {
        self.instance_path = Some(path.into());
        self
    }

    /// Render this error as one display line
    pub fn line(&self) -> String {
        // Serializing a map of JSON values cannot fail
        let params = serde_json::to_string(&self.params).unwrap_or_else(|_| "{}".to_string());
        format!("{} error: {}. Schema: {}", self.keyword, self.message, params)
    }
}

/// Rendered block of error lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    lines: Vec<String>,
}

impl ErrorPanel {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in red for terminal output
    pub fn styled(&self) -> String {
        self.lines
            .iter()
            .map(|line| style(line).red().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for ErrorPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// Render an optional error list; `None` means there is nothing to show
pub fn render_errors(errors: Option<&[ValidationError]>) -> Option<ErrorPanel> {
    let errors = errors.filter(|e| !e.is_empty())?;
    Some(ErrorPanel {
        lines: errors.iter().map(ValidationError::line).collect(),
    })
}

/// Parse an error list as produced by JSON-schema validators (a JSON array,
/// or an object with an `errors` array)
pub fn parse_errors(json: &str) -> Result<Vec<ValidationError>, serde_json::Error> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Object(mut map) if map.contains_key("errors") => {
            let errors = map.remove("errors").unwrap_or(Value::Null);
            if errors.is_null() {
                return Ok(Vec::new());
            }
            serde_json::from_value(errors)
        }
        Value::Null => Ok(Vec::new()),
        other => serde_json::from_value(other),
    }
}
