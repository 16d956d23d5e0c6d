//! Implementation of the `thumbstack outputs` command.
//!
//! Reads the JSON the engine prints for `output -json` and writes the values
//! as a `KEY=value` env file for shell tooling.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use thumbstack_lib::outputs::{parse_engine_outputs, write_env_file};

use crate::output::{OutputFormat, print_json, print_output_value, print_success, print_warning};

pub fn cmd_outputs(from: &Path, env_file: &Path, output: OutputFormat) -> Result<()> {
  let json = fs::read_to_string(from).with_context(|| format!("Failed to read engine outputs: {}", from.display()))?;
  let values = parse_engine_outputs(&json).with_context(|| format!("Failed to parse {}", from.display()))?;

  if values.is_empty() {
    print_warning("Engine reported no outputs");
  }

  write_env_file(env_file, &values).context("Failed to write env file")?;

  if output.is_json() {
    return print_json(&values);
  }

  print_success(&format!("Wrote {} output(s) to {}", values.len(), env_file.display()));
  for (key, value) in &values {
    print_output_value(key, value);
  }

  Ok(())
}
