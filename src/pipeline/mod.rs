pub mod services;
pub mod types;
