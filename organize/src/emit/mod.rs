//! Output for a finished plan.
//!
//! - `script`: bash migration script ([`ScriptWriter`])
//! - `layout`: indented dry-run listing ([`print_layout`])

pub mod layout;
pub mod script;

pub use layout::print_layout;
pub use script::{shell_escape, ScriptWriter};
