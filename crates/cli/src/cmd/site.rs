//! Implementation of the `thumbstack site` commands.
//!
//! `deploy` syncs the built site into the website bucket and `destroy`
//! empties it. The bucket name is read from the frontend env file; a missing
//! or malformed file aborts before the sync tool runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use thumbstack_lib::config::{FrontendConfig, StackConfig, load_config};
use thumbstack_lib::consts::DEFAULT_SITE_DIR;
use thumbstack_lib::site::{SiteAction, SiteSync};

use crate::output::{print_info, print_success, print_warning};

pub struct SiteOptions {
  pub tool: String,
  pub site_dir: Option<PathBuf>,
  pub env_file: Option<PathBuf>,
}

pub fn cmd_site(config: &Path, action: SiteAction, options: SiteOptions) -> Result<()> {
  let stack = if config.exists() {
    load_config(config).with_context(|| format!("Failed to load config: {}", config.display()))?
  } else {
    StackConfig::default()
  };

  let env_file = match options.env_file {
    Some(path) => path,
    None => {
      let frontend = stack.frontend.clone().unwrap_or_else(|| {
        print_warning("No [frontend] section in config; using the default env file");
        FrontendConfig::default()
      });
      stack.resolve_path(&frontend.env_file)
    }
  };
  let site_dir = options
    .site_dir
    .unwrap_or_else(|| stack.resolve_path(Path::new(DEFAULT_SITE_DIR)));

  let sync = SiteSync::from_env_file(&options.tool, &site_dir, &env_file)
    .with_context(|| format!("Failed to read website bucket from {}", env_file.display()))?;

  print_info(&format!("{action}: {}", sync.bucket_uri()));

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(sync.run(action))
    .with_context(|| format!("Site {action} failed"))?;

  print_success(&format!("Site {action} complete"));
  Ok(())
}
