pub mod commands;
pub mod config;
pub mod defaults;
pub mod install;
pub mod no_proxy;
pub mod proxy;
pub mod shell;
