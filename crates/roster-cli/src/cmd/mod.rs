pub mod assess;
pub mod cert;
pub mod config;
pub mod init;
pub mod member;
pub mod message;
pub mod serve;
pub mod skill;
pub mod succession;
pub mod trainer;
pub mod vertical;

use anyhow::Context;
use roster_core::config::Config;
use std::path::Path;

/// Load config, turning a missing `.roster/` into a readable error.
pub(crate) fn load_config(root: &Path) -> anyhow::Result<Config> {
    Config::load(root).context("failed to load .roster/config.yaml")
}
