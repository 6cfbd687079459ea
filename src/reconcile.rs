//! Zone reconciliation: ensure exactly one record carries the expected value.
//!
//! Performs one zone listing and at most one write. Re-applying the same
//! value is a no-op, so a failed invocation can always be re-run from
//! scratch.

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

use tracing::info;

use crate::client::{DnsClient, DnsError, RecordRef};

/// What [`apply`] did to the zone.
#[derive(Debug, Clone)]
pub enum Applied {
    /// A record with the expected value already existed; nothing was written.
    Untouched { record_id: u64 },
    /// An existing record carried a different value and was rewritten.
    Updated(RecordRef),
    /// No matching record existed; one was created.
    Created(RecordRef),
}

/// Ensures the zone of `root_domain` contains a `(record_type, record_name)`
/// record whose value is `value`.
///
/// Records are matched by type and name only; the first match wins and
/// duplicates are ignored. Any provider failure aborts the operation.
pub async fn apply(
    client: &dyn DnsClient,
    root_domain: &str,
    record_name: &str,
    record_type: &str,
    record_line: &str,
    value: &str,
) -> Result<Applied, DnsError> {
    info!(domain = root_domain, "listing records of root domain");
    let records = client.describe_record_list(root_domain).await?;

    let existing = records
        .iter()
        .find(|record| record.record_type == record_type && record.name == record_name);

    match existing {
        Some(record) if record.value == value => {
            info!(
                record_id = record.record_id,
                "record untouched, value is identical"
            );
            Ok(Applied::Untouched {
                record_id: record.record_id,
            })
        }
        Some(record) => {
            let updated = client
                .modify_record(root_domain, record.record_id, record_type, value, record_line)
                .await?;
            info!(
                record_id = updated.record_id,
                request_id = %updated.request_id,
                "record updated"
            );
            Ok(Applied::Updated(updated))
        }
        None => {
            let created = client
                .create_record(root_domain, record_name, record_type, value, record_line)
                .await?;
            info!(
                record_id = created.record_id,
                request_id = %created.request_id,
                "record created"
            );
            Ok(Applied::Created(created))
        }
    }
}
