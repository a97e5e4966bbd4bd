pub mod generators;
pub mod render;
pub mod saves;
