use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, IsTerminal};
use tracing_subscriber::{fmt, EnvFilter};

use pvm::commands::{self, ConfigAction, SetArgs};
use pvm::config::ConfigStore;
use pvm::{install, proxy};

#[derive(Parser)]
#[command(name = "pvm")]
#[command(about = "Cross-platform CLI tool for managing proxy environment variables")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enable proxy (prints the commands to evaluate)
    On,
    /// Disable proxy (prints the commands to evaluate)
    Off,
    /// Show current proxy configuration and status
    #[command(alias = "status")]
    List,
    /// Set proxy URL for both HTTP and HTTPS
    Set {
        /// Proxy URL applied to both HTTP and HTTPS
        url: Option<String>,
        /// Set HTTP proxy URL
        #[arg(long)]
        http: Option<String>,
        /// Set HTTPS proxy URL
        #[arg(long)]
        https: Option<String>,
        /// Set NO_PROXY list (comma-separated)
        #[arg(long = "no-proxy", allow_hyphen_values = true)]
        no_proxy: Option<String>,
    },
    /// Manage proxy configuration
    #[command(allow_external_subcommands = true)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
    /// Install the pvm wrapper function into your shell profile
    Install,
    /// Remove the pvm wrapper function from your shell profile
    Uninstall,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set configuration value (http|https|both|no-proxy)
    Set { key: Option<String>, value: Option<String> },
    /// Add item to NO_PROXY list
    Add { key: Option<String>, value: Option<String> },
    /// Remove item from NO_PROXY list
    #[command(visible_alias = "remove", alias = "del")]
    Rm { key: Option<String>, value: Option<String> },
    /// Reset configuration to defaults
    Reset,
    #[command(external_subcommand)]
    Other(Vec<String>),
}

impl From<ConfigCommands> for ConfigAction {
    fn from(command: ConfigCommands) -> Self {
        match command {
            ConfigCommands::Show => ConfigAction::Show,
            ConfigCommands::Set { key, value } => ConfigAction::Set { key, value },
            ConfigCommands::Add { key, value } => ConfigAction::Add { key, value },
            ConfigCommands::Rm { key, value } => ConfigAction::Remove { key, value },
            ConfigCommands::Reset => ConfigAction::Reset,
            ConfigCommands::Other(args) => {
                ConfigAction::Unknown(args.into_iter().next().unwrap_or_default())
            }
        }
    }
}

fn init_logging() {
    // stdout carries the shell commands, so logs go to stderr
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to initialize logging: {err}");
    }
}

fn main() -> Result<()> {
    init_logging();

    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();

    match cli.command {
        None => {
            let store = ConfigStore::open()?;
            commands::print_summary(&store, &mut stdout)?;
        }
        Some(Commands::On) => {
            let store = ConfigStore::open()?;
            commands::handle_on(&store, proxy::detect_shell(), &mut stdout)?;
        }
        Some(Commands::Off) => {
            commands::handle_off(proxy::detect_shell(), &mut stdout)?;
        }
        Some(Commands::List) => {
            let store = ConfigStore::open()?;
            commands::handle_list(&store, &mut stdout)?;
        }
        Some(Commands::Set {
            url,
            http,
            https,
            no_proxy,
        }) => {
            let mut store = ConfigStore::open()?;
            let args = SetArgs {
                url,
                http,
                https,
                no_proxy,
            };
            commands::handle_set(&mut store, args, &mut stdout)?;
        }
        Some(Commands::Config { action }) => match action {
            Some(action) => {
                let mut store = ConfigStore::open()?;
                commands::handle_config(&mut store, action.into(), &mut stdout)?;
            }
            None => commands::print_config_usage(&mut stdout)?,
        },
        Some(Commands::Install) => {
            let profile = detect_profile_or_exit();
            if let Err(err) = commands::handle_install(&profile, &mut stdout) {
                eprintln!("✗ Failed to write to config file: {err:#}");
                std::process::exit(1);
            }
        }
        Some(Commands::Uninstall) => {
            let profile = detect_profile_or_exit();
            commands::handle_uninstall(&profile, &mut stdout)?;
        }
    }

    Ok(())
}

fn detect_profile_or_exit() -> install::ShellProfile {
    match install::detect_profile() {
        Ok(profile) => profile,
        Err(err) => {
            eprintln!("✗ Could not detect shell type: {err}");
            eprintln!("Please add the pvm shell function to your shell configuration file manually.");
            std::process::exit(1);
        }
    }
}
