pub mod errors;
pub mod models;

pub use errors::*;
pub use models::*;
