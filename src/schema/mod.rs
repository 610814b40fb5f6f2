//! Schema module - Genome, configuration and reporting types.

mod config;
mod evolution;
mod genome;

pub use config::*;
pub use evolution::*;
pub use genome::*;
