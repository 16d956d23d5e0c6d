//! Implementation of the `thumbstack plan` command.
//!
//! Assembles the stack and prints its declarations grouped into creation
//! waves, with the manifest hash. Nothing is written.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use thumbstack_lib::manifest::{resource_counts, synthesize};
use thumbstack_lib::resource::ResourceKind;
use thumbstack_lib::util::hash::Hashable;

use super::assemble;
use crate::output::{OutputFormat, print_json, print_plan_entry, print_stat, print_wave_header};

#[derive(Serialize)]
struct PlanEntry<'a> {
  id: &'a str,
  kind: ResourceKind,
}

#[derive(Serialize)]
struct PlanReport<'a> {
  stack: &'a str,
  hash: String,
  waves: Vec<Vec<PlanEntry<'a>>>,
  resources: std::collections::BTreeMap<&'a str, usize>,
  outputs: Vec<&'a str>,
}

pub fn cmd_plan(config: &Path, output: OutputFormat) -> Result<()> {
  let (_, graph) = assemble(config)?;

  let manifest = synthesize(&graph).context("Failed to synthesize manifest")?;
  let hash = manifest.compute_hash().context("Failed to compute manifest hash")?;
  let waves = graph.creation_waves().context("Failed to order declarations")?;

  let report = PlanReport {
    stack: &graph.stack,
    hash: hash.0,
    waves: waves
      .iter()
      .map(|wave| {
        wave
          .iter()
          .filter_map(|id| graph.get(id.as_str()))
          .map(|d| PlanEntry {
            id: d.id.as_str(),
            kind: d.kind(),
          })
          .collect()
      })
      .collect(),
    resources: resource_counts(&manifest),
    outputs: manifest.output.keys().map(String::as_str).collect(),
  };

  if output.is_json() {
    return print_json(&report);
  }

  println!("Plan: {}", report.hash);
  println!("Stack: {}", report.stack);
  for (index, wave) in report.waves.iter().enumerate() {
    println!();
    print_wave_header(index, wave.len());
    for entry in wave {
      print_plan_entry(entry.id, entry.kind);
    }
  }

  println!();
  print_stat("Declarations", &graph.len().to_string());
  print_stat("Engine resources", &manifest.resource_count().to_string());
  print_stat("Outputs", &report.outputs.join(", "));

  Ok(())
}
