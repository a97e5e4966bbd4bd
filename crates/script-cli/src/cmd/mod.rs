pub mod config;
pub mod generate;
pub mod generators;
pub mod init;
pub mod mcp;
pub mod objective;
pub mod params;
pub mod saves;
pub mod split;
pub mod ui;
