pub mod cached;
pub mod functions;
pub mod models;
pub mod prelude;
