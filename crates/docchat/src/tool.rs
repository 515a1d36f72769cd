use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::ToolError;
use crate::messages::parts::ToolCallPart;

/// A tool that can be used by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// A JSON Schema object defining the expected parameters for the tool
    pub input_schema: Value,
}

impl Tool {
    /// Create a new tool with the given name and description
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Dependencies the chatbot's tools run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatbotDeps {
    pub secret_number: i64,
}

pub const ROULETTE_WHEEL: &str = "roulette_wheel";

pub fn roulette_wheel_tool() -> Tool {
    Tool::new(
        ROULETTE_WHEEL,
        "check if the square is a winner",
        json!({
            "type": "object",
            "required": ["square"],
            "properties": {
                "square": {"type": "integer"}
            }
        }),
    )
}

pub fn roulette_wheel(deps: &ChatbotDeps, square: i64) -> &'static str {
    if square == deps.secret_number {
        "winner"
    } else {
        "loser"
    }
}

/// Run the chatbot tool a model asked for
pub fn dispatch(call: &ToolCallPart, deps: &ChatbotDeps) -> Result<Value, ToolError> {
    match call.tool_name.as_str() {
        ROULETTE_WHEEL => {
            let args = call
                .args_as_map()
                .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;
            let square = args.get("square").and_then(Value::as_i64).ok_or_else(|| {
                ToolError::InvalidParameters("square must be an integer".to_string())
            })?;
            Ok(json!(roulette_wheel(deps, square)))
        }
        other => Err(ToolError::ToolNotFound(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPS: ChatbotDeps = ChatbotDeps { secret_number: 18 };

    #[test]
    fn test_roulette_wheel() {
        assert_eq!(roulette_wheel(&DEPS, 18), "winner");
        assert_eq!(roulette_wheel(&DEPS, 3), "loser");
    }

    #[test]
    fn test_dispatch() {
        let call = ToolCallPart::new(ROULETTE_WHEEL, r#"{"square": 18}"#, "c1");
        assert_eq!(dispatch(&call, &DEPS).unwrap(), json!("winner"));

        let call = ToolCallPart::new(ROULETTE_WHEEL, r#"{"square": "red"}"#, "c2");
        assert!(matches!(
            dispatch(&call, &DEPS),
            Err(ToolError::InvalidParameters(_))
        ));

        let call = ToolCallPart::new("spin_slots", "{}", "c3");
        assert_eq!(
            dispatch(&call, &DEPS).unwrap_err(),
            ToolError::ToolNotFound("spin_slots".into())
        );
    }
}
