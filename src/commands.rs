//! Handlers behind each CLI subcommand.
//!
//! User input mistakes are reported on `out` and return `Ok`; I/O failures
//! from the config store are propagated.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;

use crate::config::{ConfigKey, ConfigStore};
use crate::defaults;
use crate::install::{self, InstallError, ShellProfile, UninstallOutcome};
use crate::no_proxy;
use crate::proxy::{self, Shell, PROXY_ENV_VARS};
use crate::shell;

const NOT_SET: &str = "<not set>";
const EMPTY: &str = "<empty>";

/// Arguments of `pvm set`.
#[derive(Debug, Clone, Default)]
pub struct SetArgs {
    pub url: Option<String>,
    pub http: Option<String>,
    pub https: Option<String>,
    pub no_proxy: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ConfigAction {
    Show,
    Set {
        key: Option<String>,
        value: Option<String>,
    },
    Add {
        key: Option<String>,
        value: Option<String>,
    },
    Remove {
        key: Option<String>,
        value: Option<String>,
    },
    Reset,
    Unknown(String),
}

fn or_empty(value: &str) -> &str {
    if value.is_empty() {
        EMPTY
    } else {
        value
    }
}

fn print_commands<W: Write>(out: &mut W, commands: &str) -> Result<()> {
    for line in commands.lines() {
        writeln!(out, "{}", line.cyan())?;
    }
    Ok(())
}

/// Output of a bare `pvm` invocation.
pub fn print_summary<W: Write>(store: &ConfigStore, out: &mut W) -> Result<()> {
    let status = proxy::get_status(store);

    if status.is_enabled {
        writeln!(out, "{}", "✓ Proxy is ENABLED".green())?;
        let active = status.env.active_http().unwrap_or_default();
        writeln!(out, "{}", format!("  {active}").dimmed())?;
    } else {
        writeln!(out, "{}", "✗ Proxy is DISABLED".red())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", "Run \"pvm --help\" for usage information".dimmed())?;
    Ok(())
}

pub fn handle_on<W: Write>(store: &ConfigStore, shell: Shell, out: &mut W) -> Result<()> {
    let config = store.config();
    writeln!(out, "{}", "[proxy] Enabling proxy...".green())?;
    writeln!(out)?;
    print_for_shell(
        out,
        shell,
        &shell::generate_enable_commands(config),
        &shell::generate_enable_commands_powershell(config),
    )
}

pub fn handle_off<W: Write>(shell: Shell, out: &mut W) -> Result<()> {
    writeln!(out, "{}", "[proxy] Disabling proxy...".red())?;
    writeln!(out)?;
    print_for_shell(
        out,
        shell,
        &shell::generate_disable_commands(),
        &shell::generate_disable_commands_powershell(),
    )
}

fn print_for_shell<W: Write>(
    out: &mut W,
    shell: Shell,
    posix: &str,
    powershell: &str,
) -> Result<()> {
    match shell {
        Shell::PowerShell => {
            writeln!(
                out,
                "{}",
                "PowerShell detected. Run the following commands:".yellow()
            )?;
            writeln!(out)?;
            print_commands(out, powershell)?;
        }
        Shell::Bash => {
            writeln!(
                out,
                "{}",
                "Bash/Zsh detected. Run the following commands:".yellow()
            )?;
            writeln!(out)?;
            print_commands(out, posix)?;
        }
        Shell::Unknown => {
            writeln!(out, "{}", "Unknown shell. Here are commands for both:".yellow())?;
            writeln!(out)?;
            writeln!(out, "{}", "For Bash/Zsh:".blue())?;
            print_commands(out, posix)?;
            writeln!(out)?;
            writeln!(out, "{}", "For PowerShell:".blue())?;
            print_commands(out, powershell)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "{}",
        "Tip: run \"pvm install\" to let your shell apply these automatically.".dimmed()
    )?;
    Ok(())
}

pub fn handle_list<W: Write>(store: &ConfigStore, out: &mut W) -> Result<()> {
    let status = proxy::get_status(store);
    let config = &status.config;

    writeln!(out, "{}", "[proxy] Current proxy configuration:".bold())?;
    writeln!(out)?;

    writeln!(out, "{}", "Saved Configuration:".blue())?;
    writeln!(out, "  HTTP:      {}", config.http.cyan())?;
    writeln!(out, "  HTTPS:     {}", config.https.cyan())?;
    let saved_no_proxy = if config.no_proxy.is_empty() {
        NOT_SET
    } else {
        config.no_proxy.as_str()
    };
    writeln!(out, "  NO_PROXY:  {}", saved_no_proxy.cyan())?;
    writeln!(out)?;

    writeln!(out, "{}", "Environment Variables:".blue())?;
    // lower-case no_proxy is emitted but not displayed
    for name in PROXY_ENV_VARS.iter().filter(|name| **name != "no_proxy") {
        let value = status
            .env
            .get(name)
            .filter(|value| !value.is_empty())
            .unwrap_or(NOT_SET);
        let label = format!("{name}:");
        writeln!(out, "  {label:<15}{}", value.cyan())?;
    }
    writeln!(out)?;

    let state = if status.is_enabled {
        "✓ ENABLED".green()
    } else {
        "✗ DISABLED".red()
    };
    writeln!(out, "{}{}", "Status: ".bold(), state)?;
    writeln!(out)?;

    let path = format!("Config file: {}", store.get_config_path().display());
    writeln!(out, "{}", path.dimmed())?;
    Ok(())
}

pub fn handle_set<W: Write>(store: &mut ConfigStore, args: SetArgs, out: &mut W) -> Result<()> {
    if args.url.is_none() && args.http.is_none() && args.https.is_none() {
        writeln!(out, "{}", "Error: Missing URL or options".red())?;
        writeln!(out)?;
        writeln!(out, "Usage:")?;
        writeln!(out, "  pvm set <url>")?;
        writeln!(out, "  pvm set --http <url> [--https <url>] [--no-proxy <list>]")?;
        return Ok(());
    }

    if let Some(url) = args.url.as_deref() {
        if args.http.is_none() && args.https.is_none() {
            store.set_both(url).context("saving proxy URL")?;
            let message = format!("[proxy] Set both HTTP and HTTPS to: {url}");
            writeln!(out, "{}", message.green())?;
        }
    }
    if let Some(http) = args.http.as_deref() {
        store.set_http(http).context("saving HTTP proxy URL")?;
        writeln!(out, "{}", format!("[proxy] Set HTTP to: {http}").green())?;
    }
    if let Some(https) = args.https.as_deref() {
        store.set_https(https).context("saving HTTPS proxy URL")?;
        writeln!(out, "{}", format!("[proxy] Set HTTPS to: {https}").green())?;
    }
    if let Some(list) = args.no_proxy.as_deref() {
        store.set_no_proxy(list).context("saving NO_PROXY list")?;
        let message = format!("[proxy] Set NO_PROXY to: {}", or_empty(list));
        writeln!(out, "{}", message.green())?;
    }

    writeln!(out)?;
    if proxy::is_proxy_enabled() {
        writeln!(
            out,
            "{}",
            "Proxy is currently enabled. Run \"pvm on\" to apply new settings.".yellow()
        )?;
    } else {
        writeln!(
            out,
            "{}",
            "Configuration saved. Run \"pvm on\" to enable proxy.".dimmed()
        )?;
    }
    Ok(())
}

pub fn handle_config<W: Write>(
    store: &mut ConfigStore,
    action: ConfigAction,
    out: &mut W,
) -> Result<()> {
    match action {
        ConfigAction::Show => handle_list(store, out),
        ConfigAction::Set { key, value } => config_set(store, key, value, out),
        ConfigAction::Add { key, value } => config_add(store, key, value, out),
        ConfigAction::Remove { key, value } => config_remove(store, key, value, out),
        ConfigAction::Reset => {
            store.reset().context("resetting configuration")?;
            writeln!(out, "{}", "[proxy] Configuration reset to defaults".green())?;
            let url = defaults::DEFAULT_PROXY_URL;
            writeln!(out, "{}", format!("  HTTP: {url}").dimmed())?;
            writeln!(out, "{}", format!("  HTTPS: {url}").dimmed())?;
            writeln!(out, "{}", format!("  NO_PROXY: {EMPTY}").dimmed())?;
            Ok(())
        }
        ConfigAction::Unknown(name) => {
            let message = format!("Error: Unknown config action: {name}");
            writeln!(out, "{}", message.red())?;
            print_config_usage(out)
        }
    }
}

fn config_set<W: Write>(
    store: &mut ConfigStore,
    key: Option<String>,
    value: Option<String>,
    out: &mut W,
) -> Result<()> {
    let Some(name) = key else {
        writeln!(out, "{}", "Error: Missing key".red())?;
        return print_config_usage(out);
    };

    let key = match name.parse::<ConfigKey>() {
        Ok(key) => key,
        Err(err) => {
            writeln!(out, "{}", format!("Error: {err}").red())?;
            return print_config_usage(out);
        }
    };

    let value = value.unwrap_or_default();
    if key != ConfigKey::NoProxy && value.is_empty() {
        writeln!(out, "{}", format!("Error: Missing URL for {key}").red())?;
        return Ok(());
    }

    store
        .set(key, &value)
        .with_context(|| format!("saving {key}"))?;

    let message = match key {
        ConfigKey::Http => format!("[proxy] Set HTTP to: {value}"),
        ConfigKey::Https => format!("[proxy] Set HTTPS to: {value}"),
        ConfigKey::Both => format!("[proxy] Set both HTTP and HTTPS to: {value}"),
        ConfigKey::NoProxy => format!("[proxy] Set NO_PROXY to: {}", or_empty(&value)),
    };
    writeln!(out, "{}", message.green())?;
    Ok(())
}

fn config_add<W: Write>(
    store: &mut ConfigStore,
    key: Option<String>,
    value: Option<String>,
    out: &mut W,
) -> Result<()> {
    if !key.as_deref().is_some_and(ConfigKey::is_no_proxy) {
        writeln!(out, "{}", "Error: Only \"no-proxy\" can be added".red())?;
        return Ok(());
    }
    let Some(item) = value.filter(|item| !item.is_empty()) else {
        writeln!(out, "{}", "Error: Missing item to add".red())?;
        return Ok(());
    };

    let updated = no_proxy::add(&store.config().no_proxy, &item);
    store
        .set_no_proxy(&updated)
        .context("saving NO_PROXY list")?;

    let message = format!("[proxy] Added \"{item}\" to NO_PROXY");
    writeln!(out, "{}", message.green())?;
    writeln!(out, "{}", format!("NO_PROXY: {}", or_empty(&updated)).dimmed())?;
    Ok(())
}

fn config_remove<W: Write>(
    store: &mut ConfigStore,
    key: Option<String>,
    value: Option<String>,
    out: &mut W,
) -> Result<()> {
    if !key.as_deref().is_some_and(ConfigKey::is_no_proxy) {
        writeln!(out, "{}", "Error: Only \"no-proxy\" can be removed".red())?;
        return Ok(());
    }
    let Some(item) = value.filter(|item| !item.is_empty()) else {
        writeln!(out, "{}", "Error: Missing item to remove".red())?;
        return Ok(());
    };

    let updated = no_proxy::remove(&store.config().no_proxy, &item);
    store
        .set_no_proxy(&updated)
        .context("saving NO_PROXY list")?;

    let message = format!("[proxy] Removed \"{item}\" from NO_PROXY");
    writeln!(out, "{}", message.green())?;
    writeln!(out, "{}", format!("NO_PROXY: {}", or_empty(&updated)).dimmed())?;
    Ok(())
}

pub fn print_config_usage<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Usage:")?;
    writeln!(out, "  pvm config show")?;
    writeln!(out, "  pvm config set <http|https|both|no-proxy> <value>")?;
    writeln!(out, "  pvm config add no-proxy <item>")?;
    writeln!(out, "  pvm config rm no-proxy <item>")?;
    writeln!(out, "  pvm config reset")?;
    Ok(())
}

/// Installs the wrapper function. `Err` means the profile could not be
/// written.
pub fn handle_install<W: Write>(profile: &ShellProfile, out: &mut W) -> Result<()> {
    writeln!(out, "{}", "Installing pvm shell integration...".blue().bold())?;
    writeln!(out)?;
    writeln!(out, "{}", format!("Detected shell: {}", profile.shell).dimmed())?;
    let file = format!("Config file: {}", profile.path.display());
    writeln!(out, "{}", file.dimmed())?;
    writeln!(out)?;

    match install::install(profile) {
        Ok(()) => {}
        Err(InstallError::AlreadyInstalled) => {
            writeln!(out, "{}", "⚠ Shell integration is already installed!".yellow())?;
            let found = format!("Found in: {}", profile.path.display());
            writeln!(out, "{}", found.dimmed())?;
            writeln!(out)?;
            writeln!(
                out,
                "{}",
                "To reinstall, run \"pvm uninstall\" first.".cyan()
            )?;
            return Ok(());
        }
        Err(err) => return Err(err).context("writing shell profile"),
    }

    writeln!(out, "{}", "✓ Shell integration installed successfully!".green())?;
    writeln!(out)?;
    writeln!(out, "{}", "To activate the changes, run:".cyan())?;
    writeln!(out, "  {}", profile.shell.reload_hint(&profile.path))?;
    writeln!(out)?;
    writeln!(out, "{}", "Or restart your terminal.".dimmed())?;
    writeln!(out)?;
    writeln!(out, "{}", "Now you can use:".cyan())?;
    writeln!(out, "  pvm on   # Automatically enables proxy")?;
    writeln!(out, "  pvm off  # Automatically disables proxy")?;
    Ok(())
}

pub fn handle_uninstall<W: Write>(profile: &ShellProfile, out: &mut W) -> Result<()> {
    writeln!(out, "{}", "Uninstalling pvm shell integration...".blue().bold())?;
    writeln!(out)?;

    match install::uninstall(profile) {
        Ok(UninstallOutcome::Removed) => {}
        Ok(UninstallOutcome::ProfileMissing) => {
            writeln!(out, "{}", "⚠ Config file does not exist".yellow())?;
            return Ok(());
        }
        Err(InstallError::NotInstalled) => {
            writeln!(out, "{}", "⚠ Shell integration is not installed".yellow())?;
            return Ok(());
        }
        Err(InstallError::MissingEnd) => {
            writeln!(out, "{}", "⚠ Could not find end of pvm function".yellow())?;
            return Ok(());
        }
        Err(err) => return Err(err).context("updating shell profile"),
    }

    writeln!(out, "{}", "✓ Shell integration uninstalled successfully!".green())?;
    writeln!(out)?;
    writeln!(out, "{}", "To apply changes, run:".cyan())?;
    writeln!(out, "  {}", profile.shell.reload_hint(&profile.path))?;
    writeln!(out)?;
    writeln!(out, "{}", "Or restart your terminal.".dimmed())?;
    Ok(())
}
