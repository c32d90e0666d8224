//! Domain types and models
//!
//! - [`region`]: supported regions and their hosts
//! - [`operation`]: HTTP verbs, grantless scopes, operation descriptors and
//!   sandbox cases
//! - [`version`]: API version strings and their ordering
//! - [`call`]: caller input, resolved calls and call responses
//! - [`credentials`]: access tokens, role credentials and token grants
//! - [`http`]: transport-level request/response values

pub mod call;
pub mod credentials;
pub mod http;
pub mod operation;
pub mod region;
pub mod version;

pub use call::{param_to_string, CallOptions, CallRequest, CallResponse, QueryParams, ResolvedCall};
pub use credentials::{AccessToken, GrantedTokens, RoleCredentials, TokenGrant, TokenScope};
pub use http::{HttpRequest, HttpResponse};
pub use operation::{
    path_placeholders, GrantlessScope, HttpMethod, OperationDescriptor, SandboxCase,
};
pub use region::Region;
pub use version::VersionKey;
