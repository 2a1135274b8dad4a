pub mod ai;

pub use ai::{ModelClient, ModelRequest};
