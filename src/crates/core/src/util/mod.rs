pub mod errors;
pub mod text;

pub use errors::{AgentError, AgentResult};
pub use text::truncate;
