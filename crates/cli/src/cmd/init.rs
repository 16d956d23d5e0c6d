//! Implementation of the `thumbstack init` command.
//!
//! Writes a commented `stack.toml` holding every default, ready to edit.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use thumbstack_lib::config::init_config;

use crate::output::symbols;

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the config file already exists or cannot be written.
pub fn cmd_init(path: &Path) -> Result<()> {
  let written = init_config(path).context("Failed to initialize stack config")?;

  println!(
    "{} {}",
    symbols::SUCCESS.green(),
    "Initialized stack config!".green().bold()
  );
  println!();
  println!("  {} Config: {}", symbols::INFO.cyan(), written.display());
  println!();
  println!("{}", "Next steps:".bold());
  println!(
    "  1. Put each function's source under {}",
    "lambdas/<name>/".cyan()
  );
  println!("  2. Run: {}", "thumbstack plan".cyan());
  println!("  3. Run: {}", "thumbstack synth".cyan());

  Ok(())
}
