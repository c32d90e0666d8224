//! Integration tests for domain configuration and call types
//!
//! Covers the JSON shapes callers persist and hand to the client.

use spapi_domain::{
    CallRequest, ClientConfig, GrantlessScope, HttpMethod, OperationDescriptor, Region, SandboxCase,
    SpApiError,
};

/// A full configuration file as written by an application
#[test]
fn test_full_config_round_trip() {
    let json = r#"{
        "region": "FE",
        "refresh_token": "Atzr|refresh",
        "role_credentials": {
            "access_key_id": "ASIAEXAMPLE",
            "secret_access_key": "secret",
            "session_token": "session",
            "expires_at": "2030-01-01T00:00:00Z"
        },
        "credentials": {
            "client_id": "amzn1.application-oa2-client.abc",
            "client_secret": "lwa-secret",
            "aws_access_key_id": "AKIAEXAMPLE",
            "aws_secret_access_key": "aws-secret",
            "role_arn": "arn:aws:iam::123456789012:role/SellingPartner"
        },
        "options": { "sign_requests": true, "timeout_ms": 5000 }
    }"#;

    let config: ClientConfig = serde_json::from_str(json).unwrap();
    let region: Region = config.region.as_deref().unwrap().parse().unwrap();

    assert_eq!(region, Region::Fe);
    assert!(config.credentials.has_aws());
    assert!(config.role_credentials.as_ref().unwrap().is_usable(60));
    assert_eq!(config.options.timeout_ms, Some(5000));

    let serialized = serde_json::to_string(&config).unwrap();
    let again: ClientConfig = serde_json::from_str(&serialized).unwrap();
    assert_eq!(again.credentials, config.credentials);
    assert_eq!(again.options, config.options);
}

/// Call requests arrive as JSON from scripting front-ends
#[test]
fn test_call_request_from_json() {
    let call: CallRequest = serde_json::from_str(
        r#"{
            "operation": "listCatalogItems",
            "endpoint": "catalogItems",
            "query": { "MarketplaceId": "TEST", "SellerSKU": "TEST" },
            "options": { "use_sandbox": true }
        }"#,
    )
    .unwrap();

    assert_eq!(call.endpoint.as_deref(), Some("catalogItems"));
    assert_eq!(call.options.use_sandbox, Some(true));
    assert!(call.options.version.is_none());
    assert_eq!(call.query.len(), 2);
}

#[test]
fn test_descriptor_with_sandbox_cases() {
    let op = OperationDescriptor::new(HttpMethod::Get, "/orders/v0/orders/{orderId}")
        .sandbox_case(SandboxCase::new([("orderId", "TEST_CASE_200")]))
        .grantless(GrantlessScope::Notifications);

    let json = serde_json::to_value(&op).unwrap();
    assert_eq!(json["sandbox"][0]["orderId"], "TEST_CASE_200");
    assert_eq!(json["grantless_scope"], "sellingpartnerapi::notifications");

    let back: OperationDescriptor = serde_json::from_value(json).unwrap();
    assert_eq!(back, op);
}

#[test]
fn test_error_codes_are_distinct() {
    let errors = [
        SpApiError::NoRefreshTokenProvided,
        SpApiError::NoValidRegionProvided { region: Some("de".into()) },
        SpApiError::NoOperationGiven,
        SpApiError::InvalidOperationError { operation: "x".into() },
        SpApiError::EndpointNotFound { endpoint: "x".into() },
        SpApiError::InvalidOperationForEndpoint { operation: "x".into(), endpoint: "y".into() },
        SpApiError::NoScopeProvided,
        SpApiError::NoAccessTokenAndOrRoleCredentialsPresent,
        SpApiError::OperationNotFound { operation: "x".into() },
        SpApiError::InvalidSandboxParameters { operation: "x".into() },
        SpApiError::NoValidMethodProvided { method: None },
        SpApiError::VersionDefinedForInvalidEndpoints { endpoints: vec![] },
        SpApiError::InvalidVersionForEndpoints { endpoints: vec![] },
        SpApiError::InvalidVersion { endpoint: "x".into(), version: "y".into() },
        SpApiError::OperationNotFoundForVersion {
            operation: "x".into(),
            endpoint: "y".into(),
            version: "z".into(),
        },
    ];

    let mut codes: Vec<&str> = errors.iter().map(SpApiError::code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
    assert!(errors.iter().all(SpApiError::is_local));
}
