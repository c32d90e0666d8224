//! AWS Signature Version 4 request signing
//!
//! Used for SP-API calls when `sign_requests` is on (service
//! `execute-api`) and for the STS `AssumeRole` call itself (service `sts`).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use spapi_core::RequestSigner;
use spapi_domain::constants::{
    EXECUTE_API_SERVICE, HEADER_AMZ_DATE, HEADER_AUTHORIZATION, HEADER_HOST, HEADER_SECURITY_TOKEN,
};
use spapi_domain::{HttpRequest, Result, RoleCredentials, SpApiError};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// [`RequestSigner`] for one AWS service
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    service: String,
}

impl SigV4Signer {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    /// Signer for Selling Partner API calls
    #[must_use]
    pub fn execute_api() -> Self {
        Self::new(EXECUTE_API_SERVICE)
    }
}

impl Default for SigV4Signer {
    fn default() -> Self {
        Self::execute_api()
    }
}

#[async_trait]
impl RequestSigner for SigV4Signer {
    async fn sign(
        &self,
        request: HttpRequest,
        credentials: &RoleCredentials,
        aws_region: &str,
    ) -> Result<HttpRequest> {
        sign_request(request, credentials, aws_region, &self.service, Utc::now())
    }
}

/// Add `authorization` (and `x-amz-security-token`) headers to `request`
///
/// `x-amz-date` and `host` are filled in when missing. Every header present
/// on the request is signed.
///
/// # Errors
/// `CONFIG_ERROR` if the request URL cannot be parsed
pub fn sign_request(
    mut request: HttpRequest,
    credentials: &RoleCredentials,
    aws_region: &str,
    service: &str,
    now: DateTime<Utc>,
) -> Result<HttpRequest> {
    let url = Url::parse(&request.url)
        .map_err(|err| SpApiError::Config(format!("cannot sign {}: {err}", request.url)))?;

    let amz_date = match request.header_value(HEADER_AMZ_DATE) {
        Some(date) if parse_amz_date(date).is_some() => date.to_string(),
        _ => now.format(AMZ_DATE_FORMAT).to_string(),
    };
    let date = &amz_date[..8];

    request = request.header(HEADER_AMZ_DATE, amz_date.clone());
    if request.header_value(HEADER_HOST).is_none() {
        let host = match url.port() {
            Some(port) => format!("{}:{port}", url.host_str().unwrap_or_default()),
            None => url.host_str().unwrap_or_default().to_string(),
        };
        request = request.header(HEADER_HOST, host);
    }
    if let Some(token) = &credentials.session_token {
        request = request.header(HEADER_SECURITY_TOKEN, token.clone());
    }
    request.headers.remove(HEADER_AUTHORIZATION);

    let signed_headers = request.headers.keys().cloned().collect::<Vec<_>>().join(";");
    let canonical_headers: String = request
        .headers
        .iter()
        .map(|(name, value)| format!("{name}:{}\n", value.trim()))
        .collect();
    let payload_hash = hex_sha256(request.body.as_deref().unwrap_or_default().as_bytes());

    let canonical_request = format!(
        "{}\n{}\n{}\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
        request.method.as_str(),
        canonical_uri(&url),
        canonical_query(&url),
    );

    let scope = format!("{date}/{aws_region}/{service}/aws4_request");
    let string_to_sign =
        format!("{ALGORITHM}\n{amz_date}\n{scope}\n{}", hex_sha256(canonical_request.as_bytes()));

    let secret = format!("AWS4{}", credentials.secret_access_key);
    let mut key = hmac(secret.as_bytes(), date.as_bytes())?;
    for part in [aws_region, service, "aws4_request"] {
        key = hmac(&key, part.as_bytes())?;
    }
    let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

    Ok(request.header(
        HEADER_AUTHORIZATION,
        format!(
            "{ALGORITHM} Credential={}/{scope}, \
             SignedHeaders={signed_headers}, Signature={signature}",
            credentials.access_key_id
        ),
    ))
}

fn parse_amz_date(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, AMZ_DATE_FORMAT).ok()
}

/// Path segments encoded once more, as required outside S3
fn canonical_uri(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (urlencoding::encode(&k).into_owned(), urlencoding::encode(&v).into_owned()))
        .collect();
    pairs.sort();
    pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}

fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|err| SpApiError::Config(format!("invalid signing key: {err}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
