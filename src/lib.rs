//! Bookshelf application library
//!
//! Provides the `books` module and the [`App`] bootstrap shared by the
//! `bookshelf-app` binary and the CLI.

pub mod app;
pub mod modules;

pub use app::App;
