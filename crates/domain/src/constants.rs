//! Domain constants
//!
//! Hosts, header names and timing margins shared by the resolver, the
//! credential manager and the default adapters.

// Authorization server
pub const LWA_TOKEN_URL: &str = "https://api.amazon.com/auth/o2/token";
pub const STS_ENDPOINT: &str = "https://sts.amazonaws.com";
pub const STS_REGION: &str = "us-east-1";
pub const STS_API_VERSION: &str = "2011-06-15";
pub const ROLE_SESSION_NAME: &str = "spapi-session";

// Cached access tokens and role credentials are treated as expired this many
// seconds before their real expiry.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;
pub const ROLE_CREDENTIALS_EXPIRY_MARGIN_SECS: i64 = 60;
// Longest lifetime a server-reported `expires_in` is trusted for (one year).
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

// Request headers
pub const HEADER_ACCESS_TOKEN: &str = "x-amz-access-token";
pub const HEADER_AMZ_DATE: &str = "x-amz-date";
pub const HEADER_SECURITY_TOKEN: &str = "x-amz-security-token";
pub const HEADER_HOST: &str = "host";
pub const HEADER_USER_AGENT: &str = "user-agent";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

// Signing
pub const EXECUTE_API_SERVICE: &str = "execute-api";
pub const STS_SERVICE: &str = "sts";

// Transport defaults
pub const DEFAULT_USER_AGENT: &str = concat!("spapi-rust/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

// Catalog files
pub const CATALOG_FORMAT_VERSION: u32 = 1;

// Upstream error code that triggers the single authorization retry
pub const UPSTREAM_UNAUTHORIZED: &str = "Unauthorized";
pub const UPSTREAM_INVALID_GRANT: &str = "invalid_grant";
pub const UPSTREAM_INVALID_REQUEST: &str = "invalid_request";
