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
use chrono::Utc;
use hex::encode as hex_encode;
use hmac::{Hmac, KeyInit, Mac};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HOST, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, to_string};
use sha2::{Digest, Sha256};

use crate::client::{DnsClient, DnsError, Record, RecordRef};
use crate::utils::request::{DefaultDnsClient, DnsHttpClient};

type HmacSha256 = Hmac<Sha256>;

const SERVICE: &str = "dnspod";
const API_HOST: &str = "dnspod.tencentcloudapi.com";
const API_VERSION: &str = "2021-03-23";
const API_REGION: &str = "ap-guangzhou";
const ALGORITHM: &str = "TC3-HMAC-SHA256";
const SIGNED_HEADERS: &str = "content-type;host;x-tc-action";

/// Helper for signing one DNSPod API call with TC3-HMAC-SHA256.
struct Authorization {
    action: String,
    payload: String,
    timestamp: i64,
    date: String,
}

impl Authorization {
    fn new(action: &str, payload: String) -> Self {
        let now = Utc::now();
        Self {
            action: action.to_string(),
            payload,
            timestamp: now.timestamp(),
            date: now.format("%Y-%m-%d").to_string(),
        }
    }

    /// Signs a message using HMAC-SHA256.
    fn sign(key: &[u8], msg: &str) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
        mac.update(msg.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    /// Computes SHA-256 of input and returns it as a hexadecimal string.
    fn sha256_hex(input: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        hex_encode(hasher.finalize())
    }

    /// Generates the canonical request string of the TC3 signing process.
    fn canonical_request(&self) -> String {
        let canonical_headers = format!(
            "content-type:application/json; charset=utf-8\nhost:{}\nx-tc-action:{}\n",
            API_HOST,
            self.action.to_lowercase()
        );
        let hashed_payload = Self::sha256_hex(&self.payload);
        format!("POST\n/\n\n{canonical_headers}\n{SIGNED_HEADERS}\n{hashed_payload}")
    }

    /// Calculates the request signature for the given secret key.
    fn signature(&self, secret_key: &str) -> String {
        let credential_scope = format!("{}/{}/tc3_request", self.date, SERVICE);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            self.timestamp,
            credential_scope,
            Self::sha256_hex(&self.canonical_request())
        );
        let secret_date = Self::sign(format!("TC3{secret_key}").as_bytes(), &self.date);
        let secret_service = Self::sign(&secret_date, SERVICE);
        let secret_signing = Self::sign(&secret_service, "tc3_request");
        hex_encode(Self::sign(&secret_signing, &string_to_sign))
    }

    /// Builds signed HTTP request headers.
    fn build_request_headers(self, secret_id: &str, secret_key: &str) -> Result<HeaderMap, DnsError> {
        let credential_scope = format!("{}/{}/tc3_request", self.date, SERVICE);
        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            secret_id,
            credential_scope,
            SIGNED_HEADERS,
            self.signature(secret_key)
        );

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_str(&authorization)?);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        headers.insert(HOST, HeaderValue::from_static(API_HOST));
        headers.insert("X-TC-Action", HeaderValue::from_str(&self.action)?);
        headers.insert(
            "X-TC-Timestamp",
            HeaderValue::from_str(&self.timestamp.to_string())?,
        );
        headers.insert("X-TC-Version", HeaderValue::from_static(API_VERSION));
        headers.insert("X-TC-Region", HeaderValue::from_static(API_REGION));

        Ok(headers)
    }
}

#[derive(Serialize)]
struct DescribeRecordListRequest<'a> {
    #[serde(rename = "Domain")]
    domain: &'a str,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    #[serde(rename = "Domain")]
    domain: &'a str,
    #[serde(rename = "SubDomain")]
    sub_domain: &'a str,
    #[serde(rename = "RecordType")]
    record_type: &'a str,
    #[serde(rename = "Value")]
    value: &'a str,
    #[serde(rename = "RecordLine")]
    record_line: &'a str,
}

#[derive(Serialize)]
struct ModifyRecordRequest<'a> {
    #[serde(rename = "Domain")]
    domain: &'a str,
    #[serde(rename = "RecordId")]
    record_id: u64,
    #[serde(rename = "RecordType")]
    record_type: &'a str,
    #[serde(rename = "Value")]
    value: &'a str,
    #[serde(rename = "RecordLine")]
    record_line: &'a str,
}

#[derive(Deserialize)]
struct RecordListBody {
    #[serde(rename = "RecordList", default)]
    record_list: Vec<WireRecord>,
}

#[derive(Deserialize)]
struct WireRecord {
    #[serde(rename = "RecordId")]
    record_id: u64,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    record_type: String,
    #[serde(rename = "Value")]
    value: String,
    #[serde(rename = "Line", default)]
    line: String,
}

#[derive(Deserialize)]
struct WriteBody {
    #[serde(rename = "RecordId")]
    record_id: u64,
}

impl From<WireRecord> for Record {
    fn from(wire: WireRecord) -> Self {
        Record {
            record_id: wire.record_id,
            name: wire.name,
            record_type: wire.record_type,
            value: wire.value,
            line: wire.line,
        }
    }
}

/// DNS client for Tencent Cloud DNSPod.
pub struct TencentDns<T: DnsHttpClient> {
    /// HTTP client for making requests
    http_client: T,
    /// API endpoint
    api: String,
    /// API Secret ID
    secret_id: String,
    /// API Secret Key
    secret_key: String,
}

impl TencentDns<DefaultDnsClient> {
    /// Creates a DNSPod client with the default reqwest transport.
    pub fn new(secret_id: &str, secret_key: &str) -> Self {
        Self::with_http_client(DefaultDnsClient::new(), secret_id, secret_key)
    }
}

impl<T: DnsHttpClient> TencentDns<T> {
    /// Creates a DNSPod client over a custom transport.
    pub fn with_http_client(http_client: T, secret_id: &str, secret_key: &str) -> Self {
        Self {
            http_client,
            api: format!("https://{API_HOST}"),
            secret_id: secret_id.to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    /// Performs one signed API call and unwraps the `Response` envelope.
    ///
    /// An in-band `Response.Error` takes priority over body decoding and is
    /// surfaced as [`DnsError::Api`].
    async fn call<R: DeserializeOwned>(
        &self,
        action: &str,
        payload: &impl Serialize,
    ) -> Result<(String, R), DnsError> {
        let json_body = to_string(payload)?;
        let headers = Authorization::new(action, json_body.clone())
            .build_request_headers(&self.secret_id, &self.secret_key)?;

        let resp = self
            .http_client
            .request(Method::POST, self.api.clone(), headers, Some(json_body))
            .await?;

        let response = resp.get("Response").cloned().unwrap_or(Value::Null);
        if let Some(error) = response.get("Error") {
            return Err(DnsError::Api {
                code: error
                    .get("Code")
                    .and_then(Value::as_str)
                    .unwrap_or("UnknownError")
                    .to_string(),
                message: error
                    .get("Message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        let request_id = response
            .get("RequestId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let body: R = serde_json::from_value(response)?;

        Ok((request_id, body))
    }
}

#[async_trait]
impl<T: DnsHttpClient> DnsClient for TencentDns<T> {
    /// Retrieves the record list of a zone via `DescribeRecordList`.
    async fn describe_record_list(&self, domain: &str) -> Result<Vec<Record>, DnsError> {
        let (_, body): (_, RecordListBody) = self
            .call("DescribeRecordList", &DescribeRecordListRequest { domain })
            .await?;

        Ok(body.record_list.into_iter().map(Record::from).collect())
    }

    /// Creates a new record via `CreateRecord`.
    async fn create_record(
        &self,
        domain: &str,
        sub_domain: &str,
        record_type: &str,
        value: &str,
        record_line: &str,
    ) -> Result<RecordRef, DnsError> {
        let (request_id, body): (_, WriteBody) = self
            .call(
                "CreateRecord",
                &CreateRecordRequest {
                    domain,
                    sub_domain,
                    record_type,
                    value,
                    record_line,
                },
            )
            .await?;

        Ok(RecordRef {
            record_id: body.record_id,
            request_id,
        })
    }

    /// Modifies an existing record via `ModifyRecord`.
    async fn modify_record(
        &self,
        domain: &str,
        record_id: u64,
        record_type: &str,
        value: &str,
        record_line: &str,
    ) -> Result<RecordRef, DnsError> {
        let (request_id, body): (_, WriteBody) = self
            .call(
                "ModifyRecord",
                &ModifyRecordRequest {
                    domain,
                    record_id,
                    record_type,
                    value,
                    record_line,
                },
            )
            .await?;

        Ok(RecordRef {
            record_id: body.record_id,
            request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Transport that replays canned responses and captures request bodies.
    struct FakeHttp {
        responses: Mutex<Vec<Value>>,
        requests: Mutex<Vec<(HeaderMap, Option<String>)>>,
    }

    impl FakeHttp {
        fn with_responses(responses: Vec<Value>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl DnsHttpClient for &FakeHttp {
        async fn request(
            &self,
            _method: Method,
            _url: String,
            headers: HeaderMap,
            body: Option<String>,
        ) -> Result<Value, DnsError> {
            self.requests.lock().unwrap().push((headers, body));
            Ok(self.responses.lock().unwrap().remove(0))
        }
    }

    #[tokio::test]
    async fn describe_record_list_parses_records() {
        let http = FakeHttp::with_responses(vec![json!({
            "Response": {
                "RequestId": "req-1",
                "RecordList": [
                    {
                        "RecordId": 42,
                        "Name": "_acme-challenge.sub",
                        "Type": "TXT",
                        "Value": "token",
                        "Line": "默认"
                    },
                    {
                        "RecordId": 7,
                        "Name": "www",
                        "Type": "A",
                        "Value": "192.0.2.1"
                    }
                ]
            }
        })]);
        let client = TencentDns::with_http_client(&http, "id", "key");

        let records = client.describe_record_list("example.com").await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_id, 42);
        assert_eq!(records[0].name, "_acme-challenge.sub");
        assert_eq!(records[0].record_type, "TXT");
        assert_eq!(records[0].value, "token");
        assert_eq!(records[1].line, "");
    }

    #[tokio::test]
    async fn create_record_sends_expected_payload() {
        let http = FakeHttp::with_responses(vec![json!({
            "Response": { "RequestId": "req-2", "RecordId": 99 }
        })]);
        let client = TencentDns::with_http_client(&http, "id", "key");

        let created = client
            .create_record("example.com", "_acme-challenge.sub", "TXT", "token", "默认")
            .await
            .unwrap();

        assert_eq!(created.record_id, 99);
        assert_eq!(created.request_id, "req-2");

        let requests = http.requests.lock().unwrap();
        let body: Value = serde_json::from_str(requests[0].1.as_deref().unwrap()).unwrap();
        assert_eq!(body["Domain"], "example.com");
        assert_eq!(body["SubDomain"], "_acme-challenge.sub");
        assert_eq!(body["RecordType"], "TXT");
        assert_eq!(body["Value"], "token");
        assert_eq!(body["RecordLine"], "默认");
    }

    #[tokio::test]
    async fn modify_record_sends_record_id() {
        let http = FakeHttp::with_responses(vec![json!({
            "Response": { "RequestId": "req-3", "RecordId": 42 }
        })]);
        let client = TencentDns::with_http_client(&http, "id", "key");

        let updated = client
            .modify_record("example.com", 42, "TXT", "new-token", "默认")
            .await
            .unwrap();

        assert_eq!(updated.record_id, 42);

        let requests = http.requests.lock().unwrap();
        let body: Value = serde_json::from_str(requests[0].1.as_deref().unwrap()).unwrap();
        assert_eq!(body["RecordId"], 42);
        assert_eq!(body["Value"], "new-token");
    }

    #[tokio::test]
    async fn api_error_is_surfaced() {
        let http = FakeHttp::with_responses(vec![json!({
            "Response": {
                "RequestId": "req-4",
                "Error": { "Code": "AuthFailure", "Message": "secret id invalid" }
            }
        })]);
        let client = TencentDns::with_http_client(&http, "id", "key");

        let err = client.describe_record_list("example.com").await.unwrap_err();

        match err {
            DnsError::Api { code, message } => {
                assert_eq!(code, "AuthFailure");
                assert_eq!(message, "secret id invalid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn requests_carry_signed_headers() {
        let http = FakeHttp::with_responses(vec![json!({
            "Response": { "RequestId": "req-5", "RecordList": [] }
        })]);
        let client = TencentDns::with_http_client(&http, "id", "key");

        client.describe_record_list("example.com").await.unwrap();

        let requests = http.requests.lock().unwrap();
        let headers = &requests[0].0;
        assert_eq!(headers["X-TC-Action"], "DescribeRecordList");
        assert_eq!(headers["X-TC-Version"], API_VERSION);
        assert_eq!(headers["X-TC-Region"], API_REGION);
        let authorization = headers["Authorization"].to_str().unwrap();
        assert!(authorization.starts_with("TC3-HMAC-SHA256 Credential=id/"));
        assert!(authorization.contains("SignedHeaders=content-type;host;x-tc-action"));
    }

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            Authorization::sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
