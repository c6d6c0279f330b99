mod common;

use common::EnvGuard;
use pvm::config::ConfigStore;
use pvm::proxy::{self, ProxyEnv, Shell};
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_enabled_with_lower_case_variable_only() {
    let _guard = EnvGuard::set([
        ("http_proxy", Some("http://proxy.example.com:8080")),
        ("HTTP_PROXY", None),
    ]);
    assert!(proxy::is_proxy_enabled());
}

#[test]
fn test_enabled_with_upper_case_variable_only() {
    let _guard = EnvGuard::set([
        ("http_proxy", None),
        ("HTTP_PROXY", Some("http://proxy.example.com:8080")),
    ]);
    assert!(proxy::is_proxy_enabled());
}

#[test]
fn test_disabled_when_absent() {
    let _guard = EnvGuard::set([("http_proxy", None), ("HTTP_PROXY", None)]);
    assert!(!proxy::is_proxy_enabled());
}

#[test]
fn test_disabled_when_empty() {
    let _guard = EnvGuard::set([("http_proxy", Some("")), ("HTTP_PROXY", Some(""))]);
    assert!(!proxy::is_proxy_enabled());
}

#[test]
fn test_https_alone_does_not_count_as_enabled() {
    let env = ProxyEnv::from_lookup(lookup_from(&[("https_proxy", "http://h:1")]));
    assert!(!env.is_enabled());
}

#[test]
fn test_env_snapshot_distinguishes_empty_from_absent() {
    let env = ProxyEnv::from_lookup(lookup_from(&[
        ("http_proxy", "http://h:1"),
        ("NO_PROXY", ""),
    ]));
    assert_eq!(env.http_proxy.as_deref(), Some("http://h:1"));
    assert_eq!(env.no_proxy_upper.as_deref(), Some(""));
    assert_eq!(env.no_proxy, None);
    assert_eq!(env.get("HTTPS_PROXY"), None);
    assert_eq!(env.get("PATH"), None);
}

#[test]
fn test_active_http_prefers_lower_case() {
    let env = ProxyEnv::from_lookup(lookup_from(&[
        ("http_proxy", ""),
        ("HTTP_PROXY", "http://upper:1"),
    ]));
    assert_eq!(env.active_http(), Some("http://upper:1"));
}

#[test]
fn test_status_combines_config_and_env() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ConfigStore::open_at(dir.path().join("config.json")).unwrap();
    store.set_no_proxy("localhost").unwrap();

    let _guard = EnvGuard::set([
        ("http_proxy", Some("http://live:3128")),
        ("https_proxy", None),
        ("HTTP_PROXY", None),
        ("HTTPS_PROXY", None),
        ("NO_PROXY", None),
        ("no_proxy", Some("")),
    ]);

    let status = proxy::get_status(&store);
    assert!(status.is_enabled);
    assert_eq!(status.config.no_proxy, "localhost");
    assert_eq!(status.env.http_proxy.as_deref(), Some("http://live:3128"));
    assert_eq!(status.env.https_proxy, None);
    assert_eq!(status.env.no_proxy.as_deref(), Some(""));
}

#[test]
fn test_detect_posix_shells() {
    for shell in ["/bin/bash", "/usr/bin/zsh", "/bin/sh", "/usr/bin/fish"] {
        let detected = proxy::detect_shell_from(false, lookup_from(&[("SHELL", shell)]));
        assert_eq!(detected, Shell::Bash, "{shell}");
    }
}

#[test]
fn test_detect_unknown_shell() {
    assert_eq!(
        proxy::detect_shell_from(false, lookup_from(&[("SHELL", "/usr/bin/nu")])),
        Shell::Unknown
    );
    assert_eq!(proxy::detect_shell_from(false, lookup_from(&[])), Shell::Unknown);
}

#[test]
fn test_ps_module_path_ignored_off_windows() {
    let lookup = lookup_from(&[("PSModulePath", "/opt/microsoft/powershell/Modules")]);
    assert_eq!(proxy::detect_shell_from(false, lookup), Shell::Unknown);
}

#[test]
fn test_detect_powershell_on_windows() {
    let by_module_path = lookup_from(&[
        ("ComSpec", "C:\\Windows\\system32\\cmd.exe"),
        ("PSModulePath", "C:\\Program Files\\WindowsPowerShell\\Modules"),
    ]);
    assert_eq!(proxy::detect_shell_from(true, by_module_path), Shell::PowerShell);

    let by_comspec = lookup_from(&[(
        "ComSpec",
        "C:\\Windows\\System32\\WindowsPowerShell\\v1.0\\PowerShell.exe",
    )]);
    assert_eq!(proxy::detect_shell_from(true, by_comspec), Shell::PowerShell);
}

#[test]
fn test_git_bash_on_windows() {
    let lookup = lookup_from(&[
        ("SHELL", "/usr/bin/bash"),
        ("ComSpec", "C:\\Windows\\system32\\cmd.exe"),
    ]);
    assert_eq!(proxy::detect_shell_from(true, lookup), Shell::Bash);
}

#[test]
fn test_cmd_on_windows_is_unknown() {
    let lookup = lookup_from(&[("ComSpec", "C:\\Windows\\system32\\cmd.exe")]);
    assert_eq!(proxy::detect_shell_from(true, lookup), Shell::Unknown);
}
