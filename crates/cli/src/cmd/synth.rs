//! Implementation of the `thumbstack synth` command.
//!
//! Assembles the stack, packages every function source and writes the engine
//! manifest to `<out>/stacks/<stack>/`.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use thumbstack_lib::consts::DEFAULT_OUT_DIR;
use thumbstack_lib::manifest::write_stack;

use super::assemble;
use crate::output::{OutputFormat, format_assets, format_duration, print_json, print_stat, print_success, truncate_hash};

pub fn cmd_synth(config: &Path, out: Option<&Path>, output: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let (stack, graph) = assemble(config)?;

  let out_dir = match out {
    Some(dir) => dir.to_path_buf(),
    None => stack.resolve_path(Path::new(DEFAULT_OUT_DIR)),
  };

  let result = write_stack(&graph, &out_dir)
    .with_context(|| format!("Failed to synthesize stack into {}", out_dir.display()))?;

  if output.is_json() {
    print_json(&result)?;
    return Ok(());
  }

  let archive_bytes: u64 = result
    .archives
    .iter()
    .filter_map(|p| fs::metadata(p).ok())
    .map(|m| m.len())
    .sum();

  print_success(&format!("Synthesized stack {}", result.stack));
  print_stat("Manifest", &result.manifest_path.display().to_string());
  print_stat("Hash", truncate_hash(&result.hash.0));
  print_stat("Resources", &result.resources.to_string());
  print_stat("Outputs", &result.outputs.join(", "));
  print_stat("Assets", &format_assets(result.archives.len(), archive_bytes));
  print_stat("Duration", &format_duration(start.elapsed()));

  Ok(())
}
