// CLI module
// Public interface for command-line interface

mod commands;
mod render;
mod repl;

pub use commands::{format_help, Command, CommandError};
pub use render::{render_catalog, render_document};
pub use repl::{Repl, Reply};
