//! Shell integration: a `pvm` wrapper function spliced into the user's shell
//! profile so `pvm on` / `pvm off` evaluate their own output.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, warn};

/// First line of the installed block; used to find it again.
pub const INTEGRATION_MARKER: &str = "# pvm - Proxy Manager shell integration";

const SEPARATOR_WIDTH: usize = 60;

const POSIX_FUNCTION: &str = r#"
# pvm - Proxy Manager shell integration
pvm() {
  if [ "$1" = "on" ]; then
    eval "$(command pvm on 2>/dev/null | grep -E '^(export|unset)')"
    echo "✓ Proxy enabled"
  elif [ "$1" = "off" ]; then
    eval "$(command pvm off 2>/dev/null | grep -E '^(export|unset)')"
    echo "✗ Proxy disabled"
  else
    command pvm "$@"
  fi
}
"#;

const POWERSHELL_FUNCTION: &str = r#"
# pvm - Proxy Manager shell integration
function pvm {
  if ($args[0] -eq "on") {
    $commands = & (Get-Command pvm -CommandType Application).Source on 2>$null | Select-String '^\$env:|^Remove-Item'
    $commands | ForEach-Object { Invoke-Expression $_ }
    Write-Host "✓ Proxy enabled" -ForegroundColor Green
  } elseif ($args[0] -eq "off") {
    $commands = & (Get-Command pvm -CommandType Application).Source off 2>$null | Select-String '^\$env:|^Remove-Item'
    $commands | ForEach-Object { Invoke-Expression $_ }
    Write-Host "✗ Proxy disabled" -ForegroundColor Red
  } else {
    & (Get-Command pvm -CommandType Application).Source @args
  }
}
"#;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Could not find home directory")]
    NoHomeDir,
    #[error("Failed to detect PowerShell profile path: {0}")]
    PowerShellProfile(String),
    #[error("shell integration is already installed")]
    AlreadyInstalled,
    #[error("shell integration is not installed")]
    NotInstalled,
    #[error("could not find end of pvm function")]
    MissingEnd,
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileShell {
    Bash,
    Zsh,
    PowerShell,
}

impl ProfileShell {
    pub fn wrapper_function(self) -> &'static str {
        match self {
            Self::Bash | Self::Zsh => POSIX_FUNCTION,
            Self::PowerShell => POWERSHELL_FUNCTION,
        }
    }

    /// Command the user runs to reload the profile.
    pub fn reload_hint(self, profile: &Path) -> String {
        match self {
            Self::PowerShell => ". $PROFILE".to_string(),
            Self::Bash | Self::Zsh => format!("source {}", profile.display()),
        }
    }
}

impl fmt::Display for ProfileShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
            Self::PowerShell => "powershell",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellProfile {
    pub shell: ProfileShell,
    pub path: PathBuf,
}

pub fn detect_profile() -> Result<ShellProfile, InstallError> {
    let home = dirs::home_dir().ok_or(InstallError::NoHomeDir)?;
    let shell_var = env::var("SHELL").unwrap_or_default();
    detect_profile_from(&shell_var, &home, cfg!(windows), powershell_profile_path)
}

/// Picks the profile file from `SHELL`, falling back to the PowerShell
/// profile on Windows and to `~/.bashrc` elsewhere.
pub fn detect_profile_from<F>(
    shell_var: &str,
    home: &Path,
    is_windows: bool,
    powershell_profile: F,
) -> Result<ShellProfile, InstallError>
where
    F: FnOnce() -> Result<PathBuf, InstallError>,
{
    let profile = if shell_var.contains("zsh") {
        ShellProfile {
            shell: ProfileShell::Zsh,
            path: home.join(".zshrc"),
        }
    } else if shell_var.contains("bash") {
        ShellProfile {
            shell: ProfileShell::Bash,
            path: home.join(".bashrc"),
        }
    } else if is_windows {
        ShellProfile {
            shell: ProfileShell::PowerShell,
            path: powershell_profile()?,
        }
    } else {
        ShellProfile {
            shell: ProfileShell::Bash,
            path: home.join(".bashrc"),
        }
    };
    debug!(shell = %profile.shell, path = %profile.path.display(), "resolved shell profile");
    Ok(profile)
}

fn powershell_profile_path() -> Result<PathBuf, InstallError> {
    let output = Command::new("powershell")
        .args(["-NoProfile", "-Command", "echo $PROFILE"])
        .output()
        .map_err(|err| InstallError::PowerShellProfile(err.to_string()))?;

    if !output.status.success() {
        return Err(InstallError::PowerShellProfile(format!(
            "powershell exited with {}",
            output.status
        )));
    }

    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if path.is_empty() {
        return Err(InstallError::PowerShellProfile(
            "powershell returned an empty profile path".to_string(),
        ));
    }
    Ok(PathBuf::from(path))
}

pub fn is_installed(content: &str) -> bool {
    content.contains(INTEGRATION_MARKER)
}

/// Appends the separator and wrapper function to `content`.
pub fn splice_in(content: &str, shell: ProfileShell) -> Result<String, InstallError> {
    if is_installed(content) {
        return Err(InstallError::AlreadyInstalled);
    }
    let separator = "=".repeat(SEPARATOR_WIDTH);
    Ok(format!(
        "{content}\n{separator}\n{}",
        shell.wrapper_function()
    ))
}

fn is_separator(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c == '=')
}

fn is_closing_brace(line: &str) -> bool {
    line.strip_prefix('}').is_some_and(|rest| rest.trim().is_empty())
}

/// Cuts the installed block out of `content`.
///
/// The block starts at the marker, widened upward over a blank line, the
/// separator and one more blank line when they are present. It ends at the
/// first line holding only `}` plus any blank lines after it.
pub fn splice_out(content: &str) -> Result<String, InstallError> {
    let lines: Vec<&str> = content.split('\n').collect();
    let marker = lines
        .iter()
        .position(|line| line.contains(INTEGRATION_MARKER))
        .ok_or(InstallError::NotInstalled)?;

    let mut start = marker;
    if marker > 0 && lines[marker - 1].trim().is_empty() {
        start = marker - 1;
        if marker > 1 && is_separator(lines[marker - 2]) {
            start = marker - 2;
            if marker > 2 && lines[marker - 3].trim().is_empty() {
                start = marker - 3;
            }
        }
    }

    let mut end = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| is_closing_brace(line))
        .map(|(idx, _)| idx)
        .ok_or(InstallError::MissingEnd)?;

    while end + 1 < lines.len() && lines[end + 1].trim().is_empty() {
        end += 1;
    }

    let kept: Vec<&str> = lines[..start]
        .iter()
        .chain(&lines[end + 1..])
        .copied()
        .collect();
    Ok(kept.join("\n"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    Removed,
    ProfileMissing,
}

/// Appends the wrapper to the profile, creating the file and its directory
/// when needed.
pub fn install(profile: &ShellProfile) -> Result<(), InstallError> {
    let io_err = |source| InstallError::Io {
        path: profile.path.clone(),
        source,
    };

    let content = if profile.path.exists() {
        fs::read_to_string(&profile.path).map_err(io_err)?
    } else {
        String::new()
    };
    let updated = splice_in(&content, profile.shell)?;

    if let Some(parent) = profile.path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(&profile.path, updated).map_err(io_err)?;
    debug!(path = %profile.path.display(), "installed shell integration");
    Ok(())
}

pub fn uninstall(profile: &ShellProfile) -> Result<UninstallOutcome, InstallError> {
    let io_err = |source| InstallError::Io {
        path: profile.path.clone(),
        source,
    };

    if !profile.path.exists() {
        warn!(path = %profile.path.display(), "shell profile does not exist");
        return Ok(UninstallOutcome::ProfileMissing);
    }

    let content = fs::read_to_string(&profile.path).map_err(io_err)?;
    let updated = splice_out(&content)?;
    fs::write(&profile.path, updated).map_err(io_err)?;
    debug!(path = %profile.path.display(), "removed shell integration");
    Ok(UninstallOutcome::Removed)
}
