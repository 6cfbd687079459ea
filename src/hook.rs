//! The hook sequence: reconcile the zone, then wait for propagation.

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

use crate::challenge::ChallengeRequest;
use crate::client::{DnsClient, DnsError};
use crate::config::Settings;
use crate::reconcile;
use crate::resolve::{self, TxtLookup, WaitOutcome, WaitParams};

/// Publishes the challenge record, then polls until it is publicly visible.
///
/// A provider failure aborts immediately; the resolver is never consulted
/// for a record that could not be reconciled.
pub async fn run<R: TxtLookup>(
    client: &dyn DnsClient,
    resolver: &R,
    settings: &Settings,
    request: &ChallengeRequest,
) -> Result<WaitOutcome, DnsError> {
    reconcile::apply(
        client,
        &settings.root_domain,
        &request.record_name,
        &settings.record_type,
        &settings.record_line,
        &request.value,
    )
    .await?;

    let params = WaitParams {
        timeout: settings.resolution_timeout(),
        extra_wait: settings.propagation_extra_wait(),
        ..WaitParams::default()
    };
    Ok(
        resolve::wait_until_visible(resolver, &request.challenge_fqdn, &request.value, &params)
            .await,
    )
}
