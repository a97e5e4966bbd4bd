pub mod assets;
pub mod bundle;
pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod genspecs;
pub mod io;
pub mod normalize;
pub mod objective;
pub mod paths;
pub mod saves;
pub mod template;
pub mod templates;
pub mod workspace;

pub use error::{Result, ScriptError};
