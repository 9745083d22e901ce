// Shared constants and small helpers used across the engine
pub mod constants;
pub mod utils;
