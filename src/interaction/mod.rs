//! Interactive collaborators: confirmation, token entry, and group selection

pub mod prompts;
pub mod selection;

pub use prompts::{ScriptedPrompter, UserPrompter, UserPrompterImpl};
pub use selection::{offered_groups, select_by_keys, select_groups};
