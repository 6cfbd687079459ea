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

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dnspod_auth_hook::challenge::ChallengeRequest;
use dnspod_auth_hook::client::TencentDns;
use dnspod_auth_hook::config::{Cli, Settings};
use dnspod_auth_hook::resolve::SystemResolver;
use dnspod_auth_hook::{hook, wrapper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli).context("failed to resolve configuration")?;

    let default_level = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.wrap_self {
        // Script goes to stdout; everything else in this process logs to
        // stderr.
        let self_path = std::env::args().next().unwrap_or_default();
        print!("{}", wrapper::render(&settings, &self_path));
        return Ok(());
    }

    settings.validate().context("invalid configuration")?;

    let certbot_domain =
        std::env::var("CERTBOT_DOMAIN").context("CERTBOT_DOMAIN is not set")?;
    let validation_token =
        std::env::var("CERTBOT_VALIDATION").context("CERTBOT_VALIDATION is not set")?;

    let request = ChallengeRequest::new(&settings.root_domain, &certbot_domain, &validation_token);
    info!(root_domain = %request.root_domain, certbot_domain, "handling dns-01 challenge");
    info!(
        challenge_domain = %request.challenge_fqdn,
        record_name = %request.record_name,
        record_value = %request.value,
        "derived challenge record"
    );

    let client = TencentDns::new(&settings.secret_id, &settings.secret_key);
    let resolver = SystemResolver::from_system_conf()
        .context("failed to create resolver from system configuration")?;
    let outcome = hook::run(&client, &resolver, &settings, &request)
        .await
        .context("failed to reconcile challenge record")?;

    // Both outcomes exit 0: the hook confirms propagation best-effort, the
    // ACME client is the timeout authority for the challenge itself.
    info!(?outcome, "auth hook finished");
    Ok(())
}
