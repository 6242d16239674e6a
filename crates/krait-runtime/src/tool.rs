use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Async tool abstraction dispatched through the gated pipeline.
/// Uses async_trait for trait-object compatibility with the registry map.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with JSON input, returning a JSON result.
    async fn execute(&self, input: Value) -> Result<Value>;

    /// Name the pipeline registers and matches hooks against.
    fn name(&self) -> &str;
}
