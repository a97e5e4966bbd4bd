use crate::data::TemplateData;

/// Default `set_objective_value()` body: read the last value the simulation
/// wrote to `<app_ref>.stat`, or NaN if the file cannot be read.
pub fn default_objective_code(data: &TemplateData) -> String {
    let app_ref = data.text("app_ref").unwrap_or_default();
    format!(
        r#"def set_objective_value():
    try:
        data = np.loadtxt("{app_ref}.stat", ndmin=1)
        return data[-1]
    except Exception:
        return np.nan"#
    )
}

/// Fill `set_objective_code` unless the caller supplied custom code.
///
/// Custom code is kept only when it is non-blank and `custom_set_objective`
/// is not explicitly switched off.
pub fn ensure_objective_code(data: &mut TemplateData) {
    let opted_out = data.contains("custom_set_objective") && !data.flag("custom_set_objective");
    if opted_out || data.text("set_objective_code").is_none() {
        let code = default_objective_code(data);
        data.set("set_objective_code", code);
    }
}
