use crate::output::print_json;
use script_core::data::TemplateData;
use script_core::objective::default_objective_code;

pub fn run(app_ref: &str, json: bool) -> anyhow::Result<()> {
    let mut data = TemplateData::new();
    data.set("app_ref", app_ref);
    let code = default_objective_code(&data);
    if json {
        print_json(&serde_json::json!({ "set_objective_code": code }))
    } else {
        println!("{code}");
        Ok(())
    }
}
