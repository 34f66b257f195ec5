mod cache;
mod commands;
mod config;
mod dump;
mod editor;
mod jira;
mod logging;
mod template;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

use commands::{CreateArgs, ListArgs, UpdateArgs};
use config::{Config, DEFAULT_CONFIG_PATH};
use jira::cached_client::CachedJiraClient;
use jira::client::JiraClient;
use template::DEFAULT_TEMPLATE_PATH;

#[derive(Parser, Debug)]
#[command(name = "jira-cli")]
#[command(about = "Work with Jira tickets from command line")]
#[command(version)]
struct Args {
  /// Path to the configuration file
  #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
  config: PathBuf,

  /// Path to the Jinja2 template file
  #[arg(long, default_value = DEFAULT_TEMPLATE_PATH)]
  template: PathBuf,

  /// Also dump JSON files of fetched issues
  #[arg(long)]
  dump: bool,

  /// Do only read actions in Jira and show what would be done
  #[arg(long)]
  dry_run: bool,

  /// Enable info level logging output
  #[arg(short, long)]
  verbose: bool,

  /// Enable debug level logging output
  #[arg(short, long)]
  debug: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List issues (default: my issues in open sprints)
  List(ListArgs),
  /// Create a ticket
  Create(CreateArgs),
  /// Update ticket(s)
  Update(UpdateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Logging lives as long as this guard
  let _log_guard = logging::init(logging::level_for(args.verbose, args.debug))?;
  debug!("Arguments are {:?}", args);

  let config = Config::load(&args.config)?;
  let jira = JiraClient::new(&config)?;
  let mut client = CachedJiraClient::new(jira, &config)?;
  let mut out = std::io::stdout();

  match args.command {
    Command::List(list_args) => {
      let dump_dir = args.dump.then(|| Path::new(dump::DUMP_DIR));
      commands::list(&mut client, &list_args, &args.template, dump_dir, &mut out).await?;
    }
    Command::Create(create_args) => {
      commands::create(&mut client, &config, &create_args, args.dry_run, &mut out).await?;
    }
    Command::Update(update_args) => {
      commands::update(client.tracker(), &update_args, args.dry_run, &mut out).await?;
    }
  }

  Ok(())
}
