// File I/O operations

pub mod api;
pub mod attendance;
pub mod error;
pub mod json;
pub mod xlsx;

pub use error::LoadError;
