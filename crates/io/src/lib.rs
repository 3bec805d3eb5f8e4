// File I/O operations

pub mod catalog;
pub mod csv;
pub mod error;

pub use catalog::{Catalog, DatasetStatus};
pub use error::LoadError;
