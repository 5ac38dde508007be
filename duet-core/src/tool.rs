use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// JSON schema of the arguments object, if the tool takes arguments.
    fn parameters_schema(&self) -> Option<Value> {
        None
    }

    /// Function declaration sent to the model.
    fn declaration(&self) -> Value {
        let mut decl = serde_json::json!({
            "name": self.name(),
            "description": self.description(),
        });
        if let Some(params) = self.parameters_schema() {
            decl["parameters"] = params;
        }
        decl
    }

    async fn execute(&self, ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value>;
}

pub trait ToolContext: Send + Sync {
    fn invocation_id(&self) -> &str;
    fn agent_name(&self) -> &str;
    fn function_call_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestTool;

    struct TestContext;

    impl ToolContext for TestContext {
        fn invocation_id(&self) -> &str {
            "inv-1"
        }
        fn agent_name(&self) -> &str {
            "retriever"
        }
        fn function_call_id(&self) -> &str {
            "call-1"
        }
    }

    #[async_trait]
    impl Tool for TestTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "echoes its arguments"
        }

        fn parameters_schema(&self) -> Option<Value> {
            Some(serde_json::json!({"type": "object"}))
        }

        async fn execute(&self, _ctx: Arc<dyn ToolContext>, args: Value) -> Result<Value> {
            Ok(args)
        }
    }

    #[test]
    fn test_declaration_includes_parameters() {
        let decl = TestTool.declaration();
        assert_eq!(decl["name"], "echo");
        assert_eq!(decl["description"], "echoes its arguments");
        assert_eq!(decl["parameters"]["type"], "object");
    }

    #[tokio::test]
    async fn test_tool_execute() {
        let ctx = Arc::new(TestContext) as Arc<dyn ToolContext>;
        let result = TestTool.execute(ctx, serde_json::json!({"a": 1})).await.unwrap();
        assert_eq!(result["a"], 1);
    }
}
