//! certbot DNS-01 auth hook for Tencent Cloud DNSPod
//!
//! Invoked by an ACME client as `--manual-auth-hook`, this crate:
//! - reconciles the DNSPod zone so a single TXT record at
//!   `_acme-challenge.<domain>` carries the validation token
//! - polls public DNS until the record is visible (or a timeout elapses),
//!   then waits a fixed extra period for secondary resolvers to catch up
//!
//! # Example
//! ```no_run
//! use dnspod_auth_hook::challenge::ChallengeRequest;
//! use dnspod_auth_hook::client::TencentDns;
//! use dnspod_auth_hook::reconcile;
//!
//! # async fn run() -> Result<(), dnspod_auth_hook::client::DnsError> {
//! let client = TencentDns::new("your_id", "your_key");
//! let request = ChallengeRequest::new("example.com", "sub.example.com", "token");
//! reconcile::apply(&client, "example.com", &request.record_name, "TXT", "默认", &request.value)
//!     .await?;
//! # Ok(())
//! # }
//! ```

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

pub(crate) mod providers;
pub(crate) mod utils;

pub mod challenge;
pub mod client;
pub mod config;
pub mod hook;
pub mod reconcile;
pub mod resolve;
pub mod wrapper;
