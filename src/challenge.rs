//! Challenge request construction and record name derivation.

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

/// One DNS-01 challenge to publish. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ChallengeRequest {
    /// Root domain whose zone holds the record.
    pub root_domain: String,
    /// Fully-qualified domain the ACME server will query,
    /// `_acme-challenge.<certbot-domain>`.
    pub challenge_fqdn: String,
    /// Subdomain label passed to the provider: the challenge fqdn with the
    /// root domain suffix stripped.
    pub record_name: String,
    /// Validation token to publish as the TXT value.
    pub value: String,
}

impl ChallengeRequest {
    /// Derives the challenge fqdn and provider record name from the domain
    /// certbot is validating.
    ///
    /// For a root domain `example.com` and certbot domain `sub.example.com`
    /// the fqdn is `_acme-challenge.sub.example.com` and the record name is
    /// `_acme-challenge.sub`.
    pub fn new(root_domain: &str, certbot_domain: &str, value: &str) -> Self {
        let challenge_fqdn = format!("_acme-challenge.{certbot_domain}");
        let record_name = challenge_fqdn
            .strip_suffix(&format!(".{root_domain}"))
            .unwrap_or(&challenge_fqdn)
            .to_string();

        Self {
            root_domain: root_domain.to_string(),
            challenge_fqdn,
            record_name,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_name_for_subdomain() {
        let request = ChallengeRequest::new("example.com", "sub.example.com", "token");

        assert_eq!(request.challenge_fqdn, "_acme-challenge.sub.example.com");
        assert_eq!(request.record_name, "_acme-challenge.sub");
        assert_eq!(request.value, "token");
    }

    #[test]
    fn derives_name_for_apex_domain() {
        let request = ChallengeRequest::new("example.com", "example.com", "token");

        assert_eq!(request.challenge_fqdn, "_acme-challenge.example.com");
        assert_eq!(request.record_name, "_acme-challenge");
    }

    #[test]
    fn keeps_fqdn_when_root_is_not_a_suffix() {
        let request = ChallengeRequest::new("example.com", "other.net", "token");

        assert_eq!(request.challenge_fqdn, "_acme-challenge.other.net");
        assert_eq!(request.record_name, "_acme-challenge.other.net");
    }

    #[test]
    fn derives_name_for_deep_subdomain() {
        let request = ChallengeRequest::new("example.com", "a.b.example.com", "token");

        assert_eq!(request.record_name, "_acme-challenge.a.b");
    }
}
