//! JSON Schema validation producing displayable error records

use std::path::{Path, PathBuf};

use jsonschema::error::ValidationErrorKind;
use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::schema::errors::ValidationError;

/// Errors raised before any document can be checked
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("Invalid JSON schema {name}: {message}")]
    #[diagnostic(
        code(arex::schema::invalid_schema),
        help("The schema must be a valid JSON Schema document (draft 4 through 2020-12)")
    )]
    InvalidSchema { name: String, message: String },

    #[error("Cannot read {}: {source}", .path.display())]
    #[diagnostic(code(arex::schema::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {message}")]
    #[diagnostic(
        code(arex::schema::parse),
        help("Check JSON syntax - quotes, commas and brackets")
    )]
    Parse {
        message: String,

        #[source_code]
        src: NamedSource<String>,

        #[label("invalid JSON")]
        span: SourceSpan,
    },
}

/// A compiled JSON Schema
pub struct SchemaValidator {
    name: String,
    schema: JsonValue,
    compiled: JsonValidator,
}

impl SchemaValidator {
    /// Compile a schema document; `name` is used in messages
    pub fn new(name: &str, schema: JsonValue) -> Result<Self, SchemaError> {
        let compiled = validator_for(&schema).map_err(|e| SchemaError::InvalidSchema {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            schema,
            compiled,
        })
    }

    /// Load and compile a schema file
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let name = path.display().to_string();
        let schema = read_json(path)?;
        Self::new(&name, schema)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_valid(&self, instance: &JsonValue) -> bool {
        self.compiled.is_valid(instance)
    }

    /// Collect every violation of the schema
    pub fn validate(&self, instance: &JsonValue) -> Vec<ValidationError> {
        self.compiled
            .iter_errors(instance)
            .map(|e| self.to_record(&e))
            .collect()
    }

    /// Parse `content` as JSON and validate it
    pub fn validate_str(
        &self,
        content: &str,
        filename: &str,
    ) -> Result<Vec<ValidationError>, SchemaError> {
        let instance = parse_json(content, filename)?;
        Ok(self.validate(&instance))
    }

    /// Read, parse and validate a file
    pub fn validate_file(&self, path: &Path) -> Result<Vec<ValidationError>, SchemaError> {
        let instance = read_json(path)?;
        Ok(self.validate(&instance))
    }

    /// Convert a JSON Schema error to a displayable record
    fn to_record(&self, error: &JsonSchemaError) -> ValidationError {
        let schema_path = error.schema_path.to_string();
        let keyword = keyword_of(&schema_path);
        let params = self.params_for(error, &keyword, &schema_path);

        let mut record = ValidationError::new(keyword, error.to_string());
        record.params = params;
        record.with_instance_path(error.instance_path.to_string())
    }

    /// Keyword parameters, named the way ajv names them
    fn params_for(
        &self,
        error: &JsonSchemaError,
        keyword: &str,
        schema_path: &str,
    ) -> Map<String, JsonValue> {
        let mut params = Map::new();
        match &error.kind {
            ValidationErrorKind::Required { property } => {
                params.insert("missingProperty".into(), property.clone());
            }
            ValidationErrorKind::Enum { options } => {
                params.insert("allowedValues".into(), options.clone());
            }
            ValidationErrorKind::Pattern { pattern } => {
                params.insert("pattern".into(), JsonValue::String(pattern.clone()));
            }
            ValidationErrorKind::MinLength { limit } | ValidationErrorKind::MaxLength { limit } => {
                params.insert("limit".into(), JsonValue::from(*limit));
            }
            ValidationErrorKind::Minimum { limit } | ValidationErrorKind::Maximum { limit } => {
                params.insert("limit".into(), limit.clone());
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                if let Some(first) = unexpected.first() {
                    params.insert("additionalProperty".into(), JsonValue::String(first.clone()));
                }
            }
            _ => {
                // Fall back to the keyword's own value in the schema
                if let Some(value) = self.schema.pointer(schema_path) {
                    params.insert(keyword.to_string(), value.clone());
                }
            }
        }
        params
    }
}

/// Last segment of a schema path (`/properties/age/type` -> `type`)
fn keyword_of(schema_path: &str) -> String {
    schema_path
        .rsplit('/')
        .find(|segment| !segment.is_empty() && segment.parse::<usize>().is_err())
        .unwrap_or("schema")
        .replace("~1", "/")
        .replace("~0", "~")
}

fn read_json(path: &Path) -> Result<JsonValue, SchemaError> {
    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&content, &path.display().to_string())
}

fn parse_json(content: &str, filename: &str) -> Result<JsonValue, SchemaError> {
    serde_json::from_str(content).map_err(|e| SchemaError::Parse {
        message: e.to_string(),
        span: find_error_span(content, e.line(), e.column()),
        src: NamedSource::new(filename, content.to_string()),
    })
}

/// Find the span (byte offset, length) for a 1-based line/column location
fn find_error_span(content: &str, line: usize, column: usize) -> SourceSpan {
    let line = line.saturating_sub(1);
    let column = column.saturating_sub(1);

    // Real byte starts, so `\r\n` endings are counted in full
    let mut offset = content.len();
    let mut line_start = 0;
    for (i, line_content) in content.split_inclusive('\n').enumerate() {
        if i == line {
            let text = line_content.trim_end_matches(['\r', '\n']);
            offset = line_start + column.min(text.len());
            break;
        }
        line_start += line_content.len();
    }

    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }

    // Highlight the rest of the line, at least one character
    let rest_of_content = &content[offset..];
    let len = rest_of_content
        .find(['\r', '\n'])
        .unwrap_or(rest_of_content.len())
        .max(1)
        .min(rest_of_content.len());

    (offset, len).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_schema() -> SchemaValidator {
        SchemaValidator::new(
            "person",
            json!({
                "type": "object",
                "required": ["name", "age"],
                "properties": {
                    "name": {"type": "string", "minLength": 2},
                    "age": {"type": "integer", "minimum": 0},
                    "role": {"enum": ["admin", "user"]},
                    "email": {"type": "string", "pattern": "^[^@]+@[^@]+$"}
                },
                "additionalProperties": false
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_document() {
        let validator = person_schema();
        let doc = json!({"name": "Abigail", "age": 30});
        assert!(validator.is_valid(&doc));
        assert!(validator.validate(&doc).is_empty());
    }

    #[test]
    fn test_required_property() {
        let validator = person_schema();
        let errors = validator.validate(&json!({"name": "Fred"}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword, "required");
        assert_eq!(errors[0].params["missingProperty"], "age");
        assert!(errors[0].line().starts_with("required error: "));
        assert!(errors[0].line().ends_with(". Schema: {\"missingProperty\":\"age\"}"));
    }

    #[test]
    fn test_type_uses_schema_value() {
        let validator = person_schema();
        let errors = validator.validate(&json!({"name": "Mary", "age": "old"}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword, "type");
        assert_eq!(errors[0].params["type"], "integer");
        assert_eq!(errors[0].instance_path.as_deref(), Some("/age"));
    }

    #[test]
    fn test_several_violations_reported() {
        let validator = person_schema();
        let errors = validator.validate(&json!({
            "name": "J",
            "age": -1,
            "role": "root",
            "email": "nobody",
            "nickname": "x"
        }));
        let keywords: Vec<&str> = errors.iter().map(|e| e.keyword.as_str()).collect();
        for expected in ["minLength", "minimum", "enum", "pattern", "additionalProperties"] {
            assert!(keywords.contains(&expected), "missing {expected} in {keywords:?}");
        }

        let extra = errors
            .iter()
            .find(|e| e.keyword == "additionalProperties")
            .unwrap();
        assert_eq!(extra.params["additionalProperty"], "nickname");

        let min = errors.iter().find(|e| e.keyword == "minimum").unwrap();
        assert_eq!(min.params["limit"], 0);
    }

    #[test]
    fn test_invalid_schema() {
        let result = SchemaValidator::new("broken", json!({"type": "no-such-type"}));
        assert!(matches!(result, Err(SchemaError::InvalidSchema { .. })));
    }

    #[test]
    fn test_parse_error_has_span() {
        let validator = person_schema();
        let content = "{\n  \"name\": \"Fred\",\n  \"age\": ,\n}";
        let err = validator.validate_str(content, "fred.json").unwrap_err();
        match err {
            SchemaError::Parse { span, .. } => assert!(span.offset() > 0),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_keyword_of() {
        assert_eq!(keyword_of("/properties/age/type"), "type");
        assert_eq!(keyword_of("/required"), "required");
        assert_eq!(keyword_of("/anyOf/1"), "anyOf");
        assert_eq!(keyword_of(""), "schema");
    }

    #[test]
    fn test_parse_error_in_crlf_document_with_accents() {
        let validator = person_schema();
        for lines in 1..=4 {
            for accents in 1..=3 {
                let content = format!(
                    "[{}\"{}\" x]",
                    "1,\r\n".repeat(lines),
                    "é".repeat(accents)
                );
                match validator.validate_str(&content, "crlf.json") {
                    Err(SchemaError::Parse { span, .. }) => {
                        assert!(content.is_char_boundary(span.offset()));
                        assert!(content.is_char_boundary(span.offset() + span.len()));
                    }
                    other => panic!("expected parse error for {content:?}, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_find_error_span_counts_crlf() {
        let content = "{\r\n  \"name\": x\r\n}";
        let span = find_error_span(content, 2, 11);
        assert_eq!(span.offset(), 13);
        assert_eq!(&content[span.offset()..span.offset() + span.len()], "x");
    }

    #[test]
    fn test_find_error_span_clamps_to_char_boundary() {
        let content = "\"é\"";
        let span = find_error_span(content, 1, 3);
        assert_eq!(span.offset(), 1);
        assert_eq!(span.len(), 3);
    }

    #[test]
    fn test_find_error_span() {
        let content = "line one\nline two\n";
        let span = find_error_span(content, 2, 6);
        assert_eq!(span.offset(), 14);
        assert_eq!(span.len(), 3);
    }
}
