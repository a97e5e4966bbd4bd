use rust_embed::Embed;

/// Script templates and default data files compiled into the binary.
#[derive(Embed)]
#[folder = "assets/"]
struct Assets;

pub const GENERATORS_JSON: &str = "data/generators.json";
pub const GENERATOR_SPECS_JSON: &str = "data/generator_specs.json";

/// UTF-8 contents of an embedded asset.
pub fn text(path: &str) -> Option<String> {
    <Assets as Embed>::get(path).map(|f| String::from_utf8_lossy(&f.data).into_owned())
}
