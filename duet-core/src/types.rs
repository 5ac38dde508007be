use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponseData {
    pub name: String,
    pub response: serde_json::Value,
}

/// One turn of model input or output: a role label plus its parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    FunctionCall {
        name: String,
        args: serde_json::Value,
        /// Tool call ID assigned by the provider, echoed back in the response.
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    FunctionResponse {
        function_response: FunctionResponseData,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
}

impl Content {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into(), parts: Vec::new() }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text { text: text.into() });
        self
    }

    pub fn with_function_call(
        mut self,
        name: impl Into<String>,
        args: serde_json::Value,
        id: Option<String>,
    ) -> Self {
        self.parts.push(Part::FunctionCall { name: name.into(), args, id });
        self
    }

    /// All text parts joined by newlines, or `None` when there is no text.
    pub fn text(&self) -> Option<String> {
        let text = self.parts.iter().filter_map(Part::text).collect::<Vec<_>>().join("\n");
        if text.is_empty() { None } else { Some(text) }
    }

    pub fn function_calls(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| matches!(p, Part::FunctionCall { .. }))
    }

    pub fn has_function_calls(&self) -> bool {
        self.function_calls().next().is_some()
    }
}

impl Part {
    /// Returns the text content if this is a Text part, None otherwise
    pub fn text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_text_joins_parts() {
        let content = Content::new("model").with_text("first").with_text("second");
        assert_eq!(content.text().as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_content_without_text() {
        let content =
            Content::new("model").with_function_call("retrieve_tips", json!({"query": "q"}), None);
        assert!(content.text().is_none());
        assert!(content.has_function_calls());
    }

    #[test]
    fn test_function_response_serializes_camel_case() {
        let part = Part::FunctionResponse {
            function_response: FunctionResponseData {
                name: "retrieve_tips".to_string(),
                response: json!("Source: A => b"),
            },
            id: None,
        };
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["functionResponse"]["name"], "retrieve_tips");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_untagged_text_deserializes() {
        let part: Part = serde_json::from_value(json!({"text": "hello"})).unwrap();
        assert_eq!(part.text(), Some("hello"));
    }
}
