//! Call parameter types

use serde_json::Value;

/// Value of a call parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// A plain string, sent as-is (percent-encoded on the wire).
    Text(String),
    /// A structured value, rendered to its canonical JSON string before sending.
    Json(Value),
}

impl ParameterValue {
    /// Renders the value for the wire.
    ///
    /// Text values and JSON strings are sent unquoted; any other JSON value
    /// goes through `render_json`.
    ///
    /// # Errors
    ///
    /// Propagates the failure of `render_json`.
    pub fn render_with<E>(
        &self,
        render_json: impl FnOnce(&Value) -> Result<String, E>,
    ) -> Result<String, E> {
        match self {
            Self::Text(text) | Self::Json(Value::String(text)) => Ok(text.clone()),
            Self::Json(value) => render_json(value),
        }
    }
}

/// An immutable name/value pair sent with an API call.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: ParameterValue,
}

impl Parameter {
    /// Creates a string-valued parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::Text(value.into()),
        }
    }

    /// Creates a parameter whose value is a structured JSON value.
    #[must_use]
    pub fn json(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::Json(value),
        }
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameter value.
    #[must_use]
    pub const fn value(&self) -> &ParameterValue {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_parameter() {
        let param = Parameter::new("fields", "id,name");
        assert_eq!(param.name(), "fields");
        assert_eq!(param.value(), &ParameterValue::Text("id,name".to_string()));
    }

    #[test]
    fn test_json_parameter() {
        let param = Parameter::json("targeting", serde_json::json!({"countries": ["US"]}));
        assert!(matches!(param.value(), ParameterValue::Json(_)));
    }

    #[test]
    fn test_render_unwraps_json_strings() {
        let render = |value: &ParameterValue| {
            value.render_with(|json| Ok::<_, ()>(format!("<{json}>")))
        };
        assert_eq!(render(&ParameterValue::Text("a".to_string())), Ok("a".to_string()));
        assert_eq!(
            render(&ParameterValue::Json(Value::String("x".to_string()))),
            Ok("x".to_string())
        );
        assert_eq!(
            render(&ParameterValue::Json(serde_json::json!([1]))),
            Ok("<[1]>".to_string())
        );
    }
}
