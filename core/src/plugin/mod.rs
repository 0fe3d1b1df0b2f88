pub mod config;
pub mod facade;
