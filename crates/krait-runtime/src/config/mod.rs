//! Two-tier (user-global / project-local) JSON settings with hook layering.

pub mod merge;
pub mod schema;
pub mod store;

pub use merge::{merge_hooks, merge_settings};
pub use schema::{
    HookDefinition, HookEntries, HookType, HooksConfig, MatcherGroup, Settings, COMMAND_HOOK_KIND,
};
pub use store::{
    locate_project_root, ConfigScope, ConfigStore, HooksConfigView, CONFIG_DIR, CONFIG_FILE,
    NO_LOCAL_HOOKS_ENV,
};
