use script_core::workspace::Workspace;
use script_core::Result;
use serde_json::Value;

pub mod create_scripts;
pub mod list_generators;

/// A tool exposed over MCP. A `Value::String` result is sent to the client
/// verbatim; anything else is pretty-printed JSON. Errors are reported by the
/// dispatcher as an `isError` tool result, not as a protocol error.
pub trait ScriptTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> Value;
    fn call(&self, args: Value, ws: &Workspace) -> Result<Value>;
}

pub fn all_tools() -> Vec<Box<dyn ScriptTool>> {
    vec![
        Box::new(create_scripts::CreateScriptsTool),
        Box::new(list_generators::ListGeneratorsTool),
    ]
}
