//! Rendering of proxy variables as shell statements.
//!
//! The enable/disable logic builds a shell-agnostic list of [`EnvCommand`]s
//! which [`ShellSyntax`] turns into text. Values are interpolated verbatim
//! inside double quotes without escaping.

use crate::config::ProxyConfig;

const HTTP_KEYS: [&str; 2] = ["http_proxy", "HTTP_PROXY"];
const HTTPS_KEYS: [&str; 2] = ["https_proxy", "HTTPS_PROXY"];
const NO_PROXY_KEYS: [&str; 2] = ["NO_PROXY", "no_proxy"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvAction {
    Set(String),
    Unset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvCommand {
    pub name: &'static str,
    pub action: EnvAction,
}

impl EnvCommand {
    pub fn set(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            action: EnvAction::Set(value.into()),
        }
    }

    pub fn unset(name: &'static str) -> Self {
        Self {
            name,
            action: EnvAction::Unset,
        }
    }
}

/// Statements that point every proxy variable at the configured endpoints.
///
/// Order: `http_proxy`, `https_proxy`, `HTTP_PROXY`, `HTTPS_PROXY`, then
/// `NO_PROXY` and `no_proxy`, which are unset when the list is empty.
pub fn enable_plan(config: &ProxyConfig) -> Vec<EnvCommand> {
    let mut plan = Vec::with_capacity(6);
    for (http, https) in HTTP_KEYS.into_iter().zip(HTTPS_KEYS) {
        plan.push(EnvCommand::set(http, config.http.as_str()));
        plan.push(EnvCommand::set(https, config.https.as_str()));
    }

    for key in NO_PROXY_KEYS {
        if config.no_proxy.is_empty() {
            plan.push(EnvCommand::unset(key));
        } else {
            plan.push(EnvCommand::set(key, config.no_proxy.as_str()));
        }
    }
    plan
}

pub fn disable_plan() -> Vec<EnvCommand> {
    HTTP_KEYS
        .into_iter()
        .zip(HTTPS_KEYS)
        .flat_map(|(http, https)| [http, https])
        .chain(NO_PROXY_KEYS)
        .map(EnvCommand::unset)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellSyntax {
    Posix,
    PowerShell,
}

impl ShellSyntax {
    pub fn render_command(self, command: &EnvCommand) -> String {
        match (self, &command.action) {
            (Self::Posix, EnvAction::Set(value)) => {
                format!("export {}=\"{}\"", command.name, value)
            }
            (Self::Posix, EnvAction::Unset) => format!("unset {}", command.name),
            (Self::PowerShell, EnvAction::Set(value)) => {
                format!("$env:{}=\"{}\"", command.name, value)
            }
            (Self::PowerShell, EnvAction::Unset) => {
                format!("Remove-Item Env:{} -ErrorAction SilentlyContinue", command.name)
            }
        }
    }

    /// Newline-joined statements without a trailing newline.
    pub fn render(self, plan: &[EnvCommand]) -> String {
        plan.iter()
            .map(|command| self.render_command(command))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn generate_enable_commands(config: &ProxyConfig) -> String {
    ShellSyntax::Posix.render(&enable_plan(config))
}

pub fn generate_disable_commands() -> String {
    ShellSyntax::Posix.render(&disable_plan())
}

pub fn generate_enable_commands_powershell(config: &ProxyConfig) -> String {
    ShellSyntax::PowerShell.render(&enable_plan(config))
}

pub fn generate_disable_commands_powershell() -> String {
    ShellSyntax::PowerShell.render(&disable_plan())
}
