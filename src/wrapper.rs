//! Self-wrapping script generation for `--wrap-self`.

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

use crate::config::Settings;

const TEMPLATE: &str = include_str!("../wrapper.sh");

/// Escapes a value spliced between single quotes in a POSIX shell script.
fn quote(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Renders a shell script that exports the resolved configuration as
/// `AUTHHOOK_*` variables and execs `self_path`.
pub fn render(settings: &Settings, self_path: &str) -> String {
    TEMPLATE
        .replace("{{self}}", &quote(self_path))
        .replace("{{secret_id}}", &quote(&settings.secret_id))
        .replace("{{secret_key}}", &quote(&settings.secret_key))
        .replace("{{root_domain}}", &quote(&settings.root_domain))
        .replace("{{record_type}}", &quote(&settings.record_type))
        .replace("{{record_line}}", &quote(&settings.record_line))
        .replace("{{timeout}}", &settings.timeout.to_string())
        .replace("{{extra_wait}}", &settings.extra_wait.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            secret_id: "id".to_string(),
            secret_key: "key".to_string(),
            root_domain: "example.com".to_string(),
            record_type: "TXT".to_string(),
            record_line: "默认".to_string(),
            timeout: 600,
            extra_wait: 100,
            debug: false,
        }
    }

    #[test]
    fn renders_all_placeholders() {
        let script = render(&settings(), "/usr/local/bin/dnspod-auth-hook");

        assert!(script.starts_with("#!/bin/sh"));
        assert!(script.contains("export AUTHHOOK_SECRET_ID='id'"));
        assert!(script.contains("export AUTHHOOK_SECRET_KEY='key'"));
        assert!(script.contains("export AUTHHOOK_ROOT_DOMAIN='example.com'"));
        assert!(script.contains("export AUTHHOOK_TIMEOUT='600'"));
        assert!(script.contains("export AUTHHOOK_EXTRA_WAIT='100'"));
        assert!(script.contains("exec '/usr/local/bin/dnspod-auth-hook' \"$@\""));
        assert!(!script.contains("{{"), "unrendered placeholder left behind");
    }

    #[test]
    fn escapes_single_quotes_in_values() {
        let mut settings = settings();
        settings.secret_key = "k'ey".to_string();

        let script = render(&settings, "/opt/o'brien/dnspod-auth-hook");

        assert!(script.contains("export AUTHHOOK_SECRET_KEY='k'\\''ey'"));
        assert!(script.contains("exec '/opt/o'\\''brien/dnspod-auth-hook' \"$@\""));
    }
}
