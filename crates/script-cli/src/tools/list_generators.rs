use super::ScriptTool;
use script_core::workspace::Workspace;
use script_core::Result;
use serde_json::{json, Value};

pub struct ListGeneratorsTool;

impl ScriptTool for ListGeneratorsTool {
    fn name(&self) -> &str {
        "ListGenerators"
    }

    fn description(&self) -> &str {
        "List generator modules and functions that CreateLibEnsembleScripts accepts"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    fn call(&self, _args: Value, ws: &Workspace) -> Result<Value> {
        let modules: Vec<Value> = ws
            .catalog
            .modules()
            .iter()
            .map(|m| {
                let with_specs: Vec<&String> = m
                    .generators
                    .iter()
                    .filter(|g| ws.specs.lookup(&format!("{}.{}", m.module, g)).is_some())
                    .collect();
                json!({
                    "gen_module": m.module,
                    "description": m.description,
                    "gen_functions": m.generators,
                    "custom_gen_specs": with_specs,
                })
            })
            .collect();
        Ok(json!({ "generators": modules }))
    }
}
