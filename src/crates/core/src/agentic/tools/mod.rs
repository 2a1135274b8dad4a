//! Tool system
//!
//! Dispatch of model-requested tool calls and the pre-dispatch guard seam.

pub mod dispatcher;
pub mod guard;

pub use dispatcher::{DispatchedCall, ToolCallOutcome, ToolDispatcher, ToolTransport, TIMED_OUT};
pub use guard::{AllowAll, ToolCallGuard};
