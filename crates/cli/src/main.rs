mod cmd;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use thumbstack_lib::config::config_path;
use thumbstack_lib::consts::DEFAULT_SYNC_TOOL;
use thumbstack_lib::site::SiteAction;

use cmd::{SiteOptions, cmd_init, cmd_outputs, cmd_plan, cmd_site, cmd_synth};
use output::{OutputFormat, print_error};

/// thumbstack - assemble the thumbnail pipeline's cloud resources
#[derive(Parser)]
#[command(name = "thumbstack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Stack config file (default: $THUMBSTACK_CONFIG, then stack.toml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Write a commented default stack config
  Init,

  /// Assemble the stack and write the engine manifest and assets
  Synth {
    /// Output directory (default: cdktf.out next to the config)
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Assemble the stack and show creation order without writing anything
  Plan {
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Convert the engine's `output -json` document into an env file
  Outputs {
    /// JSON document produced by the engine
    #[arg(long)]
    from: PathBuf,

    /// Env file to write
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Push or remove the static website
  Site {
    #[command(subcommand)]
    action: SiteCommand,

    /// S3-compatible CLI used for the sync
    #[arg(long, global = true, default_value = DEFAULT_SYNC_TOOL)]
    tool: String,

    /// Built site directory (default: website/site next to the config)
    #[arg(long, global = true)]
    site_dir: Option<PathBuf>,

    /// Env file holding the bucket name (default: the frontend env file)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
  },
}

#[derive(Subcommand)]
enum SiteCommand {
  /// Upload the site to the website bucket
  Deploy,
  /// Empty the website bucket
  Destroy,
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let config = config_path(cli.config.as_deref());
  debug!(config = %config.display(), "resolved config path");

  let result = match cli.command {
    Commands::Init => cmd_init(&config),
    Commands::Synth { out, output } => cmd_synth(&config, out.as_deref(), output),
    Commands::Plan { output } => cmd_plan(&config, output),
    Commands::Outputs { from, env_file, output } => cmd_outputs(&from, &env_file, output),
    Commands::Site {
      action,
      tool,
      site_dir,
      env_file,
    } => {
      let action = match action {
        SiteCommand::Deploy => SiteAction::Deploy,
        SiteCommand::Destroy => SiteAction::Destroy,
      };
      cmd_site(
        &config,
        action,
        SiteOptions {
          tool,
          site_dir,
          env_file,
        },
      )
    }
  };

  if let Err(err) = result {
    print_error(&err);
    std::process::exit(1);
  }
}
