pub mod constants;
pub mod error;
pub mod models;
pub mod modules;
pub mod version;

#[cfg(feature = "python-bindings")]
pub mod python;
