//! Tool discovery and invocation
//!
//! ```rust,ignore
//! let directory = ToolDirectory::new(client);
//! for tool in directory.list_tools().await? {
//!     println!("{}: {}", tool.name(), tool.params_template());
//! }
//!
//! let output = directory.call_tool_text("echo", r#"{"text": "hi"}"#).await?;
//! ```

mod descriptor;
mod directory;

pub use descriptor::{extract_schema_keys, parse_tool_listing, ToolDescriptor};
pub use directory::{ToolDirectory, CALL_TOOL_METHOD, LIST_TOOLS_METHOD};
