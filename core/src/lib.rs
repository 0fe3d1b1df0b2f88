pub mod determinism;
pub mod eval;
pub mod evidence;
pub mod plugin;
pub mod policy;
pub mod resources;
pub mod validator;

pub mod error;
