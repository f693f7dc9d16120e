//! Core traits, settings, and module lifecycle for the bookshelf app.

pub mod module;
pub mod registry;
pub mod settings;

pub use bookshelf_db::Migration;
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
