pub mod classify;
pub mod engine;
pub mod types;
