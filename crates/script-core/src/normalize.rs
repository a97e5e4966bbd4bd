//! Raw form/tool parameters → template-ready data.
//!
//! [`Normalizer::normalize`] is total: every missing or malformed field is
//! defaulted, never rejected. It is also idempotent, so feeding its output
//! back in yields the same map.
//!
//! Bound arrays print their elements as `0.0` / `3.0` rather than the bare
//! `0` / `3` the JavaScript form tool emitted; both are valid numpy input.

use crate::data::{value_flag, TemplateData};
use crate::genspecs::GeneratorSpecs;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_DIMENSION: i64 = 2;

/// Largest accepted `dimension`. Adapters reject anything above it; the
/// normalizer clamps to it.
pub const MAX_DIMENSION: i64 = 10_000;

/// Key under which the matched generator-spec override is stashed for the
/// secondary render pass.
pub const CUSTOM_SPEC_KEY: &str = "_custom_spec";

const LOWER_BOUND: &str = "0.0";
const UPPER_BOUND: &str = "3.0";

// ---------------------------------------------------------------------------
// Allocator selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocChoice {
    pub alloc_module: String,
    pub alloc_function: String,
    pub alloc_specs_user: String,
}

/// Two-way allocator lookup: APOSMM generators need their own allocator,
/// everything else runs with persistent generators only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocTable {
    pub aposmm: AllocChoice,
    pub default: AllocChoice,
}

impl Default for AllocTable {
    fn default() -> Self {
        Self {
            aposmm: AllocChoice {
                alloc_module: "persistent_aposmm_alloc".to_string(),
                alloc_function: "persistent_aposmm_alloc".to_string(),
                alloc_specs_user: String::new(),
            },
            default: AllocChoice {
                alloc_module: "start_only_persistent".to_string(),
                alloc_function: "only_persistent_gens".to_string(),
                alloc_specs_user: r#"user={"async_return": True},"#.to_string(),
            },
        }
    }
}

impl AllocTable {
    pub fn select(&self, gen_function: &str) -> &AllocChoice {
        if gen_function.to_lowercase().contains("aposmm") {
            &self.aposmm
        } else {
            &self.default
        }
    }
}

// ---------------------------------------------------------------------------
// InputType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    File,
    Directory,
}

impl InputType {
    /// Anything that is not `"directory"` is treated as a single file.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "directory" => InputType::Directory,
            _ => InputType::File,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::File => "file",
            InputType::Directory => "directory",
        }
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

pub struct Normalizer<'a> {
    specs: &'a GeneratorSpecs,
    alloc: &'a AllocTable,
}

impl<'a> Normalizer<'a> {
    pub fn new(specs: &'a GeneratorSpecs, alloc: &'a AllocTable) -> Self {
        Self { specs, alloc }
    }

    pub fn normalize(&self, mut data: TemplateData) -> TemplateData {
        apply_dimension(&mut data);
        self.apply_custom_spec(&mut data);
        apply_gpus(&mut data);
        apply_cluster(&mut data);
        apply_input(&mut data);
        self.apply_alloc(&mut data);
        data
    }

    fn apply_custom_spec(&self, data: &mut TemplateData) {
        let module = data.text("gen_module").unwrap_or_default();
        let function = data.text("gen_function").unwrap_or_default();
        let key = format!(
            "{}.{}",
            module.trim().to_lowercase(),
            function.trim().to_lowercase()
        );
        data.set_opt(CUSTOM_SPEC_KEY, self.specs.lookup(&key).cloned());
    }

    fn apply_alloc(&self, data: &mut TemplateData) {
        let gen_function = data.text("gen_function").unwrap_or_default();
        let choice = self.alloc.select(&gen_function);
        data.set("alloc_module", choice.alloc_module.as_str());
        data.set("alloc_function", choice.alloc_function.as_str());
        data.set("alloc_specs_user", choice.alloc_specs_user.as_str());
    }
}

/// Normalize with the built-in allocator table.
pub fn normalize(raw: TemplateData, specs: &GeneratorSpecs) -> TemplateData {
    Normalizer::new(specs, &AllocTable::default()).normalize(raw)
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

fn apply_dimension(data: &mut TemplateData) {
    let dimension = data
        .int("dimension")
        .filter(|d| *d > 0)
        .map(|d| d.min(MAX_DIMENSION))
        .unwrap_or(DEFAULT_DIMENSION);
    data.set("dimension", dimension);
    data.set("lb_array", array_literal(dimension, LOWER_BOUND));
    data.set("ub_array", array_literal(dimension, UPPER_BOUND));
}

fn array_literal(len: i64, element: &str) -> String {
    let mut out = String::from("np.array([");
    for (i, e) in std::iter::repeat(element).take(len as usize).enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(e);
    }
    out.push_str("])");
    out
}

fn apply_gpus(data: &mut TemplateData) {
    let auto_gpus = data.flag("auto_gpus");
    let num_gpus = data.int("gpus").filter(|n| *n > 0).unwrap_or(0);
    let gpus_line = if !auto_gpus && num_gpus > 0 {
        format!("num_gpus={num_gpus},")
    } else {
        String::new()
    };
    data.set("auto_gpus", auto_gpus);
    data.set("num_gpus", num_gpus);
    data.set("gpus_line", gpus_line);
    data.set("needs_mpich_gpu_support", auto_gpus || num_gpus > 0);
}

fn apply_cluster(data: &mut TemplateData) {
    let enabled = data.flag("cluster_enable");
    let (total_nodes, scheduler) = if enabled {
        (
            present(data.get("cluster_total_nodes")),
            present(data.get("scheduler_type")),
        )
    } else {
        (None, None)
    };
    data.set("cluster_enabled", enabled);
    data.set_opt("cluster_total_nodes", total_nodes.clone());
    data.set_opt("scheduler_type", scheduler);
    data.set_opt("total_nodes", total_nodes);
}

fn apply_input(data: &mut TemplateData) {
    let input_type = InputType::from_raw(data.get("input_type").and_then(Value::as_str));
    let input_usage = data
        .text("input_usage")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "directory".to_string());
    let templated = data.flag("templated_enable");
    let template_vars = template_vars(data.get("template_vars"));
    let input_path = data.text("input_path");

    data.set("input_type", input_type.as_str());
    data.set("input_usage_cmdline", input_usage == "cmdline");
    data.set("input_usage", input_usage.as_str());
    data.set("templated_enabled", templated);

    let derived_filename = match input_type {
        InputType::File => {
            let base = input_path.as_deref().map(basename);
            data.set("input_file", input_path.clone().unwrap_or_default());
            data.set_opt("input_file_basename", base.clone());
            data.set_null("sim_input_dir");
            data.set_null("templated_filename");
            base.unwrap_or_default()
        }
        InputType::Directory => {
            let templated_filename = if templated {
                data.text("templated_filename")
            } else {
                None
            };
            data.set_null("input_file");
            data.set_null("input_file_basename");
            data.set("sim_input_dir", input_path.unwrap_or_default());
            data.set_opt("templated_filename", templated_filename.clone());
            templated_filename.unwrap_or_default()
        }
    };

    let has_vars = templated && !template_vars.is_empty();
    let needs_filename = input_usage == "cmdline" || has_vars;
    if needs_filename && !derived_filename.is_empty() {
        data.set("input_filename", derived_filename);
    } else {
        data.unset("input_filename");
    }

    if has_vars {
        let list: Vec<String> = template_vars.iter().map(|v| format!("\"{v}\"")).collect();
        data.set("has_template_vars", true);
        data.set("template_vars_list", list.join(", "));
        data.set("input_names", template_vars);
        data.set("has_input_names", true);
    } else {
        data.set("has_template_vars", false);
        data.set("template_vars_list", "");
        data.unset("input_names");
        data.set("has_input_names", false);
    }
}

/// Template variable names: a list, or a comma-separated string from agents
/// that flatten lists. Blank entries are dropped.
fn template_vars(raw: Option<&Value>) -> Vec<String> {
    let entries: Vec<String> = match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    entries
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Last path segment, splitting on both separators.
pub fn basename(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}

/// Pass-through value unless it is null, blank, `false` or zero.
fn present(v: Option<&Value>) -> Option<Value> {
    v.filter(|v| value_flag(v) || matches!(v, Value::String(s) if !s.trim().is_empty()))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(raw: Value) -> TemplateData {
        normalize(
            TemplateData::from_value(raw).unwrap(),
            &GeneratorSpecs::default(),
        )
    }

    #[test]
    fn dimension_defaults_to_two() {
        for raw in [json!({}), json!({"dimension": 0}), json!({"dimension": -3}), json!({"dimension": "abc"})] {
            let data = run(raw);
            assert_eq!(data.get("dimension"), Some(&json!(2)));
            assert_eq!(data.text("lb_array").unwrap(), "np.array([0.0, 0.0])");
        }
    }

    #[test]
    fn bound_arrays_match_dimension() {
        for d in 1..=6 {
            let data = run(json!({ "dimension": d.to_string() }));
            let lb = data.text("lb_array").unwrap();
            let ub = data.text("ub_array").unwrap();
            let inner = |s: &str| {
                s.trim_start_matches("np.array([")
                    .trim_end_matches("])")
                    .split(", ")
                    .count()
            };
            assert_eq!(inner(&lb), d);
            assert_eq!(inner(&ub), d);
            assert!(ub.contains("3.0"));
        }
    }

    #[test]
    fn oversized_dimension_is_clamped() {
        for raw in ["100000000000", "9223372036854775807"] {
            let data = run(json!({ "dimension": raw }));
            assert_eq!(data.get("dimension"), Some(&json!(MAX_DIMENSION)));
            let lb = data.text("lb_array").unwrap();
            assert_eq!(lb.matches("0.0").count(), MAX_DIMENSION as usize);
        }
    }

    #[test]
    fn aposmm_selects_aposmm_allocator() {
        let data = run(json!({"gen_function": "Persistent_Aposmm"}));
        assert_eq!(data.text("alloc_module").unwrap(), "persistent_aposmm_alloc");
        assert_eq!(data.text("alloc_function").unwrap(), "persistent_aposmm_alloc");
        assert_eq!(data.get("alloc_specs_user"), Some(&json!("")));
    }

    #[test]
    fn other_generators_select_default_allocator() {
        let data = run(json!({"gen_function": "uniform_random"}));
        assert_eq!(data.text("alloc_module").unwrap(), "start_only_persistent");
        assert_eq!(data.text("alloc_function").unwrap(), "only_persistent_gens");
        assert_eq!(
            data.text("alloc_specs_user").unwrap(),
            r#"user={"async_return": True},"#
        );
    }

    #[test]
    fn template_vars_populate_input_names() {
        let data = run(json!({
            "templated_enable": true,
            "template_vars": ["theta", " ", "phi"]
        }));
        assert_eq!(data.get("has_template_vars"), Some(&json!(true)));
        assert_eq!(data.text("template_vars_list").unwrap(), r#""theta", "phi""#);
        assert_eq!(data.get("input_names"), Some(&json!(["theta", "phi"])));
        assert_eq!(data.get("has_input_names"), Some(&json!(true)));
    }

    #[test]
    fn disabled_templating_removes_input_names() {
        for raw in [
            json!({"templated_enable": false, "template_vars": ["x"]}),
            json!({"templated_enable": true, "template_vars": []}),
            json!({"templated_enable": true, "input_names": ["stale"]}),
        ] {
            let data = run(raw);
            assert!(!data.contains("input_names"));
            assert_eq!(data.get("has_input_names"), Some(&json!(false)));
            assert_eq!(data.get("has_template_vars"), Some(&json!(false)));
        }
    }

    #[test]
    fn comma_separated_template_vars_are_split() {
        let data = run(json!({"templated_enable": "on", "template_vars": "X0, X1"}));
        assert_eq!(data.get("input_names"), Some(&json!(["X0", "X1"])));
    }

    #[test]
    fn directory_usage_without_templating_has_no_input_filename() {
        let data = run(json!({
            "input_usage": "directory",
            "templated_enable": false,
            "input_path": "/data/input.txt",
            "input_filename": "leftover"
        }));
        assert!(!data.contains("input_filename"));
    }

    #[test]
    fn cmdline_usage_sets_input_filename_from_basename() {
        let data = run(json!({
            "input_usage": "cmdline",
            "input_path": r"C:\runs\case\input.deck"
        }));
        assert_eq!(data.text("input_filename").unwrap(), "input.deck");
        assert_eq!(data.text("input_file_basename").unwrap(), "input.deck");
        assert_eq!(data.get("input_usage_cmdline"), Some(&json!(true)));
    }

    #[test]
    fn directory_mode_uses_templated_filename() {
        let data = run(json!({
            "input_type": "directory",
            "input_path": "/home/user/warpx_input",
            "templated_enable": true,
            "templated_filename": "inputs.in",
            "template_vars": ["x0"]
        }));
        assert_eq!(data.get("input_file"), Some(&Value::Null));
        assert_eq!(data.text("sim_input_dir").unwrap(), "/home/user/warpx_input");
        assert_eq!(data.text("templated_filename").unwrap(), "inputs.in");
        assert_eq!(data.text("input_filename").unwrap(), "inputs.in");
    }

    #[test]
    fn input_file_and_dir_are_exclusive() {
        for raw in [
            json!({}),
            json!({"input_type": "file", "input_path": "a/b.txt"}),
            json!({"input_type": "directory"}),
            json!({"input_type": "directory", "input_path": "dir"}),
            json!({"input_type": "bogus", "input_path": "x"}),
        ] {
            let data = run(raw);
            let file_set = !matches!(data.get("input_file"), Some(Value::Null) | None);
            let dir_set = !matches!(data.get("sim_input_dir"), Some(Value::Null) | None);
            assert!(file_set ^ dir_set, "{data:?}");
        }
    }

    #[test]
    fn file_mode_clears_templated_filename() {
        let data = run(json!({
            "input_type": "file",
            "templated_enable": true,
            "templated_filename": "ignored.in"
        }));
        assert_eq!(data.get("templated_filename"), Some(&Value::Null));
    }

    #[test]
    fn manual_gpus_set_gpus_line() {
        let data = run(json!({"auto_gpus": false, "gpus": "2"}));
        assert_eq!(data.text("gpus_line").unwrap(), "num_gpus=2,");
        assert_eq!(data.get("needs_mpich_gpu_support"), Some(&json!(true)));

        let data = run(json!({"auto_gpus": false, "gpus": "0"}));
        assert_eq!(data.get("gpus_line"), Some(&json!("")));
        assert_eq!(data.get("needs_mpich_gpu_support"), Some(&json!(false)));
    }

    #[test]
    fn auto_gpus_suppresses_gpus_line() {
        let data = run(json!({"auto_gpus": true, "gpus": "4"}));
        assert_eq!(data.get("gpus_line"), Some(&json!("")));
        assert_eq!(data.get("needs_mpich_gpu_support"), Some(&json!(true)));
    }

    #[test]
    fn cluster_fields_forced_null_when_disabled() {
        let data = run(json!({
            "cluster_enable": false,
            "cluster_total_nodes": "8",
            "scheduler_type": "slurm"
        }));
        assert_eq!(data.get("cluster_enabled"), Some(&json!(false)));
        assert_eq!(data.get("cluster_total_nodes"), Some(&Value::Null));
        assert_eq!(data.get("scheduler_type"), Some(&Value::Null));
        assert_eq!(data.get("total_nodes"), Some(&Value::Null));

        let data = run(json!({
            "cluster_enable": true,
            "cluster_total_nodes": "8",
            "scheduler_type": "pbs"
        }));
        assert_eq!(data.get("total_nodes"), Some(&json!("8")));
        assert_eq!(data.text("scheduler_type").unwrap(), "pbs");
    }

    #[test]
    fn custom_spec_lookup_is_case_insensitive() {
        let specs = GeneratorSpecs::from_value(json!({
            " Persistent_Sampling.Persistent_Uniform ": "batch_size=4,"
        }));
        let data = normalize(
            TemplateData::from_value(json!({
                "gen_module": "persistent_sampling",
                "gen_function": "PERSISTENT_UNIFORM"
            }))
            .unwrap(),
            &specs,
        );
        assert_eq!(data.get(CUSTOM_SPEC_KEY), Some(&json!("batch_size=4,")));

        let data = normalize(TemplateData::new(), &specs);
        assert_eq!(data.get(CUSTOM_SPEC_KEY), Some(&Value::Null));
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in [
            json!({}),
            json!({
                "app_ref": "warpx",
                "dimension": "3",
                "input_type": "directory",
                "input_path": "/in",
                "templated_enable": true,
                "templated_filename": "t.in",
                "template_vars": ["a", "b"],
                "input_usage": "cmdline",
                "cluster_enable": "on",
                "cluster_total_nodes": 4,
                "scheduler_type": "slurm",
                "gpus": "1",
                "gen_function": "aposmm"
            }),
            json!({"input_type": "file", "input_path": "x/y.txt", "input_usage": "cmdline"}),
        ] {
            let once = run(raw);
            let twice = normalize(once.clone(), &GeneratorSpecs::default());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn unknown_keys_pass_through() {
        let data = run(json!({"max_sims": "8", "sim_app": "/bin/app"}));
        assert_eq!(data.text("max_sims").unwrap(), "8");
        assert_eq!(data.text("sim_app").unwrap(), "/bin/app");
    }
}
