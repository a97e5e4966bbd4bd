use super::ScriptTool;
use script_core::data::TemplateData;
use script_core::workspace::Workspace;
use script_core::Result;
use serde_json::{json, Value};

pub struct CreateScriptsTool;

fn string_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn bool_prop(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

impl ScriptTool for CreateScriptsTool {
    fn name(&self) -> &str {
        "CreateLibEnsembleScripts"
    }

    fn description(&self) -> &str {
        "Render script using existing script-creator templates"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "app_ref": string_prop("Application reference name"),
                "num_workers": string_prop("Number of workers"),
                "sim_app": string_prop("Path to simulation application"),
                "input_path": string_prop("Path to input file or directory"),
                "dimension": string_prop("Number of parameters"),
                "max_sims": string_prop("Maximum simulations"),
                "input_type": string_prop("Input type: file or directory"),
                "templated_enable": bool_prop("Enable templated input file"),
                "templated_filename": string_prop("Template filename"),
                "template_vars": {
                    "type": "array",
                    "description": "Template variable names",
                    "items": { "type": "string" }
                },
                "cluster_enable": bool_prop("Enable cluster mode"),
                "cluster_total_nodes": string_prop("Total nodes for cluster"),
                "scheduler_type": string_prop("Scheduler type (slurm or pbs)"),
                "gen_module": string_prop("Generator module"),
                "gen_function": string_prop("Generator function"),
                "nodes": string_prop("Number of nodes"),
                "procs": string_prop("Number of processes"),
                "gpus": string_prop("Number of GPUs"),
                "auto_gpus": bool_prop("Assign GPUs automatically"),
                "input_usage": string_prop("Input usage: directory or cmdline"),
                "custom_set_objective": bool_prop("Use custom set_objective function"),
                "set_objective_code": string_prop("Custom set_objective_value() function code")
            },
            "additionalProperties": true
        })
    }

    fn call(&self, args: Value, ws: &Workspace) -> Result<Value> {
        let raw = TemplateData::from_value(args)?;
        let bundle = ws.render(raw)?;
        tracing::info!(files = ?bundle.filenames(), "rendered scripts");
        Ok(Value::String(bundle.to_sectioned_text()))
    }
}
