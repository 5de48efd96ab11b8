//! External JSON interface.

pub mod json_api;

pub use json_api::{
    apply_command, apply_command_json, export_state_json, import_state_json, Command,
};
