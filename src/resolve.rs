//! Propagation waiting: poll public DNS until the challenge record is
//! visible or a deadline expires.
//!
//! Resolution is best-effort: lookup failures never abort the loop, and an
//! expired deadline is not an error. Both paths fall through to the
//! unconditional extra wait and a successful return; the ACME client remains
//! the timeout authority for the overall challenge.

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

use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::error::ResolveError;
use tokio::time::{Instant, sleep, timeout};
use tracing::{info, warn};

/// Resolver capability needed by the waiter.
pub trait TxtLookup: Send + Sync {
    /// Looks up every TXT value currently visible for `fqdn`.
    fn lookup_txt(&self, fqdn: &str)
    -> impl Future<Output = Result<Vec<String>, ResolveError>> + Send;
}

/// TXT lookups against the system-configured public resolver.
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    /// Creates a resolver from `/etc/resolv.conf` (or the platform
    /// equivalent).
    pub fn from_system_conf() -> Result<Self, ResolveError> {
        Ok(Self {
            inner: TokioAsyncResolver::tokio_from_system_conf()?,
        })
    }
}

impl TxtLookup for SystemResolver {
    async fn lookup_txt(&self, fqdn: &str) -> Result<Vec<String>, ResolveError> {
        let lookup = self.inner.txt_lookup(fqdn).await?;
        Ok(lookup.iter().map(|txt| txt.to_string()).collect())
    }
}

/// Timing knobs of the poll loop.
#[derive(Debug, Clone)]
pub struct WaitParams {
    /// Overall budget for observing the record.
    pub timeout: Duration,
    /// Unconditional sleep after the loop, for secondary resolver caches.
    pub extra_wait: Duration,
    /// Budget of a single lookup, independent of the overall budget.
    pub attempt_timeout: Duration,
    /// Sleep between unsuccessful attempts.
    pub poll_interval: Duration,
}

impl Default for WaitParams {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            extra_wait: Duration::from_secs(100),
            attempt_timeout: Duration::from_secs(3),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Terminal state of the poll loop. Neither variant is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A TXT value equal to the expected one was observed.
    Resolved,
    /// The overall budget elapsed without a match.
    DeadlineExceeded,
}

/// Polls TXT records of `fqdn` until one equals `expected` or
/// `params.timeout` elapses, then sleeps `params.extra_wait` regardless.
///
/// Values are compared by exact string equality. Lookup errors and
/// per-attempt timeouts count as "not yet visible".
pub async fn wait_until_visible<R: TxtLookup>(
    resolver: &R,
    fqdn: &str,
    expected: &str,
    params: &WaitParams,
) -> WaitOutcome {
    let start = Instant::now();
    let mut resolved = false;

    while !resolved && start.elapsed() < params.timeout {
        match timeout(params.attempt_timeout, resolver.lookup_txt(fqdn)).await {
            Err(_) => warn!(fqdn, "txt lookup exceeded attempt budget"),
            Ok(Err(err)) => warn!(fqdn, %err, "failed to lookup txt record"),
            Ok(Ok(values)) => {
                for value in &values {
                    let matched = value == expected;
                    info!(value = %value, matched, "txt record observed");
                    resolved = resolved || matched;
                }
            }
        }

        if resolved {
            break;
        }
        sleep(params.poll_interval).await;
    }

    let outcome = if resolved {
        WaitOutcome::Resolved
    } else {
        warn!(
            fqdn,
            timeout = ?params.timeout,
            "record not observed before deadline, continuing anyway"
        );
        WaitOutcome::DeadlineExceeded
    };

    info!(extra_wait = ?params.extra_wait, "waiting out secondary resolver caches");
    sleep(params.extra_wait).await;

    outcome
}
