use serde_json::Value;

/// Pre-dispatch check on a model-requested tool call.
///
/// A rejected call never reaches the transport; the reason is returned to the
/// model as an error result.
pub trait ToolCallGuard: Send + Sync {
    fn check(&self, name: &str, input: &Value) -> Result<(), String>;
}

/// Guard for conversations with no transaction in flight.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl ToolCallGuard for AllowAll {
    fn check(&self, _name: &str, _input: &Value) -> Result<(), String> {
        Ok(())
    }
}
