//! Handlers the runtime registers on its own.

pub mod delete;

pub use delete::{DELETE_BUTTON_KEY, DeleteButtonId, delete_button, delete_button_handler};
