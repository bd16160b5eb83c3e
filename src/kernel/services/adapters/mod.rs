//! Service adapters: runtime and filesystem specific implementations.

pub mod json;
pub mod runtime;
pub mod settings;

pub use json::{json_collaborators, JsonDocument, JsonLabelProvider};
pub use runtime::{AsyncRuntime, EffectRunner};
pub use settings::{
    ensure_log_dir, ensure_settings_file, get_log_dir, get_settings_path, load_settings,
    load_settings_from, SettingsError,
};
