use anyhow::{bail, Context};
use clap::Args;
use script_core::data::TemplateData;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Parameter input shared by every command that renders.
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// YAML or JSON mapping of parameters, or `-` for stdin
    #[arg(long, short = 'p')]
    pub params: Option<PathBuf>,

    /// Set a single parameter (repeatable), e.g. `--set app_ref=warpx`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

impl ParamArgs {
    /// Read the parameter file (if any) and apply `--set` on top.
    ///
    /// `--set` values are stored as strings, the same way a form submits them.
    pub fn load(&self) -> anyhow::Result<TemplateData> {
        let mut data = match &self.params {
            Some(path) => {
                let text = read_input(path)?;
                // YAML parser; plain JSON files are valid YAML.
                let value: Value = serde_yaml::from_str(&text)
                    .with_context(|| format!("invalid parameters in {}", path.display()))?;
                TemplateData::from_value(value)?
            }
            None => TemplateData::new(),
        };
        for pair in &self.set {
            let (key, value) = parse_set(pair)?;
            data.set(key, value);
        }
        Ok(data)
    }
}

/// Contents of `path`, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn parse_set(pair: &str) -> anyhow::Result<(&str, &str)> {
    let Some((key, value)) = pair.split_once('=') else {
        bail!("expected KEY=VALUE, got '{pair}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in '{pair}'");
    }
    Ok((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn yaml_params_file_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.yaml");
        std::fs::write(
            &path,
            "app_ref: warpx\ncluster_enable: true\ntemplate_vars:\n  - X0\n  - X1\n",
        )
        .unwrap();
        let args = ParamArgs {
            params: Some(path),
            set: vec![],
        };
        let data = args.load().unwrap();
        assert_eq!(data.text("app_ref").unwrap(), "warpx");
        assert!(data.flag("cluster_enable"));
        assert_eq!(data.get("template_vars"), Some(&serde_json::json!(["X0", "X1"])));
    }

    #[test]
    fn set_overrides_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.json");
        std::fs::write(&path, r#"{"app_ref": "old", "dimension": 3}"#).unwrap();
        let args = ParamArgs {
            params: Some(path),
            set: vec!["app_ref=new".into(), "input_path=a=b.txt".into()],
        };
        let data = args.load().unwrap();
        assert_eq!(data.text("app_ref").unwrap(), "new");
        assert_eq!(data.int("dimension"), Some(3));
        assert_eq!(data.text("input_path").unwrap(), "a=b.txt");
    }

    #[test]
    fn malformed_set_is_rejected() {
        assert!(parse_set("novalue").is_err());
        assert!(parse_set("=x").is_err());
        assert_eq!(parse_set("k=").unwrap(), ("k", ""));
    }

    #[test]
    fn non_object_params_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.json");
        std::fs::write(&path, "[1]").unwrap();
        let args = ParamArgs {
            params: Some(path),
            set: vec![],
        };
        assert!(args.load().is_err());
    }
}
