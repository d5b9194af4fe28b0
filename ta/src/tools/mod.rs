//! Tool system for the planning steps
//!
//! Tools are registered once at startup. The model asks for them by name;
//! whatever happens inside a tool comes back to the model as text.

mod error;
mod registry;
mod traits;

pub mod builtin;

pub use error::ToolError;
pub use registry::ToolRegistry;
pub use traits::{Tool, ToolResult};
