//! Terminal rendering for thumbstack commands.
//!
//! Status lines, plan waves colored by resource category, published output
//! listings, and `--output json` for scripts.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream, Style};

use thumbstack_lib::resource::ResourceKind;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  pub const PLUS: &str = "+";
}

/// Manifest hashes are shown shortened in text output.
pub fn truncate_hash(hash: &str) -> &str {
  &hash[..hash.len().min(12)]
}

pub fn format_bytes(bytes: u64) -> String {
  const KB: u64 = 1024;
  const MB: u64 = KB * 1024;

  match bytes {
    b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
    b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
    b => format!("{b} B"),
  }
}

pub fn format_duration(duration: Duration) -> String {
  match duration.as_secs() {
    0 => format!("{}ms", duration.subsec_millis()),
    secs => format!("{}.{:02}s", secs, duration.subsec_millis() / 10),
  }
}

/// `3 archives (1.2 KB)`
pub fn format_assets(count: usize, bytes: u64) -> String {
  let noun = if count == 1 { "archive" } else { "archives" };
  format!("{count} {noun} ({})", format_bytes(bytes))
}

/// Color for a declaration kind in plan listings.
fn kind_style(kind: ResourceKind) -> Style {
  match kind {
    ResourceKind::StorageBucket | ResourceKind::BucketPublicAccess | ResourceKind::BucketWebsite => {
      Style::new().green()
    }
    ResourceKind::ArtifactAsset | ResourceKind::DeployableFunction | ResourceKind::InvocationRetryPolicy => {
      Style::new().cyan()
    }
    ResourceKind::NotificationBinding | ResourceKind::FailureTopic | ResourceKind::FailureSubscription => {
      Style::new().yellow()
    }
    ResourceKind::DiscoveryEntry
    | ResourceKind::PublicInvocationEndpoint
    | ResourceKind::PublishedOutput
    | ResourceKind::LocalFile => Style::new().magenta(),
  }
}

pub fn print_wave_header(index: usize, size: usize) {
  let header = format!("Wave {}:", index + 1);
  println!(
    "{} {}",
    header.if_supports_color(Stream::Stdout, |s| s.bold()),
    format!("{size} declaration(s)").if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
}

pub fn print_plan_entry(id: &str, kind: ResourceKind) {
  println!(
    "  {} {} {}",
    symbols::PLUS.if_supports_color(Stream::Stdout, |s| s.style(kind_style(kind))),
    id,
    format!("({kind})").if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
}

/// One published output, `name → value`.
pub fn print_output_value(name: &str, value: &str) {
  println!(
    "  {} {} {}",
    name.if_supports_color(Stream::Stdout, |s| s.bold()),
    symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

/// Print an error and each of its causes on its own line.
pub fn print_error(err: &anyhow::Error) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    err.if_supports_color(Stream::Stderr, |s| s.red())
  );
  for cause in err.chain().skip(1) {
    eprintln!(
      "  {} {}",
      symbols::ARROW.if_supports_color(Stream::Stderr, |s| s.dimmed()),
      cause
    );
  }
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}
