/// Proxy endpoint used for both HTTP and HTTPS until the user sets one
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:20170";

/// Directory under the user's home that holds the config file
pub const CONFIG_DIR_NAME: &str = ".pvm";

pub const CONFIG_FILE_NAME: &str = "config.json";

pub fn default_proxy_url() -> String {
    DEFAULT_PROXY_URL.to_string()
}

/// The NO_PROXY list starts out empty
pub fn default_no_proxy() -> String {
    String::new()
}
