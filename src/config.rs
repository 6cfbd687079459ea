//! Configuration resolution: flags, environment, and config files merged
//! once at startup into an immutable [`Settings`] value.
//!
//! Precedence, highest first: command-line flags, `AUTHHOOK_*` environment
//! variables, an `authhook.*` config file, built-in defaults. The working
//! directory, `/etc`, and the user's home directory are searched in that
//! order for a config file and only the first one found is read; later
//! directories never override it. Core components never read this state
//! themselves; they receive it.

// Copyright 2025 dnspod-auth-hook authors
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// certbot DNS-01 auth hook for Tencent Cloud DNSPod.
#[derive(Debug, Clone, Parser)]
#[command(name = "dnspod-auth-hook", version, about)]
pub struct Cli {
    /// Tencent Cloud API secret id
    #[arg(long)]
    pub secret_id: Option<String>,

    /// Tencent Cloud API secret key
    #[arg(long)]
    pub secret_key: Option<String>,

    /// Root domain whose zone holds the challenge record
    #[arg(long)]
    pub root_domain: Option<String>,

    /// Record type to publish
    #[arg(long)]
    pub record_type: Option<String>,

    /// DNSPod routing line for the record
    #[arg(long)]
    pub record_line: Option<String>,

    /// Resolution timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Extra wait in seconds; dns relays sometimes serve the old value
    #[arg(long)]
    pub extra_wait: Option<u64>,

    /// Log at debug level
    #[arg(long)]
    pub debug: bool,

    /// Print a script wrapping this binary with the resolved configuration
    #[arg(long)]
    pub wrap_self: bool,
}

/// Fully resolved hook configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub secret_id: String,
    pub secret_key: String,
    pub root_domain: String,
    pub record_type: String,
    pub record_line: String,
    /// Resolution timeout in seconds.
    pub timeout: u64,
    /// Extra wait in seconds.
    pub extra_wait: u64,
    pub debug: bool,
}

/// Extensions `authhook.*` config files are probed with, in priority order.
const CONFIG_EXTENSIONS: [&str; 5] = ["toml", "yaml", "yml", "json", "ini"];

/// Returns the first `authhook.*` file found under `search_dirs`.
fn find_config_file(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .flat_map(|dir| {
            CONFIG_EXTENSIONS
                .iter()
                .map(move |ext| dir.join(format!("authhook.{ext}")))
        })
        .find(|candidate| candidate.is_file())
}

impl Settings {
    /// Merges defaults, the first config file found, environment, and flags.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut search_dirs = vec![PathBuf::from("."), PathBuf::from("/etc")];
        if let Some(home) = dirs::home_dir() {
            search_dirs.push(home);
        }
        Self::load_from(cli, &search_dirs)
    }

    fn load_from(cli: &Cli, search_dirs: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("secret_id", "")?
            .set_default("secret_key", "")?
            .set_default("root_domain", "")?
            .set_default("record_type", "TXT")?
            .set_default("record_line", "默认")?
            .set_default("timeout", 600u64)?
            .set_default("extra_wait", 100u64)?
            .set_default("debug", false)?;

        if let Some(path) = find_config_file(search_dirs) {
            builder = builder.add_source(File::from(path));
        }

        builder = builder
            .add_source(Environment::with_prefix("AUTHHOOK"))
            .set_override_option("secret_id", cli.secret_id.clone())?
            .set_override_option("secret_key", cli.secret_key.clone())?
            .set_override_option("root_domain", cli.root_domain.clone())?
            .set_override_option("record_type", cli.record_type.clone())?
            .set_override_option("record_line", cli.record_line.clone())?
            .set_override_option("timeout", cli.timeout)?
            .set_override_option("extra_wait", cli.extra_wait)?;

        if cli.debug {
            builder = builder.set_override("debug", true)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Rejects configurations the provider client cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("secret_id", &self.secret_id),
            ("secret_key", &self.secret_key),
            ("root_domain", &self.root_domain),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Message(format!("{key} must be set")));
            }
        }
        Ok(())
    }

    pub fn resolution_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn propagation_extra_wait(&self) -> Duration {
        Duration::from_secs(self.extra_wait)
    }
}
