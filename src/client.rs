//! Provider capability interface for zone record management.
//!
//! The reconciler only ever talks to [`DnsClient`], so an alternative DNS
//! provider can be substituted by implementing the three record operations.

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

use async_trait::async_trait;
use thiserror::Error;

pub use crate::providers::tencent::TencentDns;
pub use crate::utils::request::{DefaultDnsClient, DnsHttpClient};

/// Errors raised while talking to a DNS provider.
///
/// Every variant is fatal to the invocation: the hook aborts and the ACME
/// client is expected to re-run it. Re-running is safe because reconciliation
/// is idempotent.
#[derive(Debug, Error)]
pub enum DnsError {
    /// HTTP transport failure.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON shape the provider documents.
    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// In-band error returned by the provider API.
    #[error("provider api error: {code}: {message}")]
    Api { code: String, message: String },

    /// A signed request header could not be constructed.
    #[error("invalid request header: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

/// One record of a zone, as listed by the provider.
///
/// Identity for reconciliation is `(record_type, name)` within one root
/// domain; `value` and `line` are mutable attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Provider-assigned identifier.
    pub record_id: u64,
    /// Subdomain label relative to the root domain, e.g. `_acme-challenge.sub`.
    pub name: String,
    /// Record type, e.g. `TXT`.
    pub record_type: String,
    /// Record value.
    pub value: String,
    /// Routing line the record applies to.
    pub line: String,
}

/// Reference to a record returned by a write operation.
#[derive(Debug, Clone)]
pub struct RecordRef {
    /// Provider-assigned identifier of the created or updated record.
    pub record_id: u64,
    /// Provider request id, logged for audit trails.
    pub request_id: String,
}

/// Record operations a DNS provider must support for the hook to work.
#[async_trait]
pub trait DnsClient: Send + Sync {
    /// Lists every record in the zone of `domain`.
    async fn describe_record_list(&self, domain: &str) -> Result<Vec<Record>, DnsError>;

    /// Creates a record under `domain`.
    async fn create_record(
        &self,
        domain: &str,
        sub_domain: &str,
        record_type: &str,
        value: &str,
        record_line: &str,
    ) -> Result<RecordRef, DnsError>;

    /// Rewrites the value (and type/line) of an existing record.
    async fn modify_record(
        &self,
        domain: &str,
        record_id: u64,
        record_type: &str,
        value: &str,
        record_line: &str,
    ) -> Result<RecordRef, DnsError>;
}
