// Configuration loading

pub mod paths;
pub mod settings;

pub use paths::{DataPaths, DatasetPaths};
pub use settings::{ConfigError, Settings};
