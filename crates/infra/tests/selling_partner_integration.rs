//! End-to-end tests of a built client against a mock SP-API, LWA and STS

use serde_json::json;
use spapi_domain::{AppCredentials, CallRequest, ClientConfig, ClientOptions, GrantlessScope};
use spapi_infra::SellingPartnerBuilder;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TOKEN_PATH: &str = "/auth/o2/token";

fn token_response(access_token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600
    }))
}

fn seller_config() -> ClientConfig {
    ClientConfig::new("na", "Atzr|seller")
        .with_credentials(AppCredentials::lwa("amzn1.application-oa2-client.e2e", "e2e-secret"))
}

fn builder(server: &MockServer, config: ClientConfig) -> SellingPartnerBuilder {
    SellingPartnerBuilder::new(config)
        .token_url(format!("{}{TOKEN_PATH}", server.uri()))
        .sts_endpoint(server.uri())
        .api_base_url(server.uri())
}

#[tokio::test]
async fn delegated_call_uses_refreshed_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=Atzr%7Cseller"))
        .respond_with(token_response("Atza|e2e"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sellers/v1/marketplaceParticipations"))
        .and(header("x-amz-access-token", "Atza|e2e"))
        .and(header_exists("x-amz-date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payload": [{"marketplace": {"id": "ATVPDKIKX0DER"}}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = builder(&server, seller_config()).build().unwrap();

    for _ in 0..2 {
        let response =
            client.call_api(CallRequest::new("getMarketplaceParticipations")).await.unwrap();
        assert_eq!(response.body[0]["marketplace"]["id"], "ATVPDKIKX0DER");
    }
    assert_eq!(client.access_token().await.map(|t| t.token), Some("Atza|e2e".to_string()));
}

#[tokio::test]
async fn query_parameters_reach_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response("Atza|q"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders/v0/orders"))
        .and(query_param("MarketplaceIds", "ATVPDKIKX0DER,A2EUQ1WTGCTBG2"))
        .and(query_param("CreatedAfter", "2024-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payload": {"Orders": []}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = builder(&server, seller_config()).build().unwrap();
    let response = client
        .call_api(
            CallRequest::new("getOrders")
                .with_query("MarketplaceIds", json!(["ATVPDKIKX0DER", "A2EUQ1WTGCTBG2"]))
                .with_query("CreatedAfter", "2024-01-01T00:00:00Z"),
        )
        .await
        .unwrap();

    assert_eq!(response.body, json!({"Orders": []}));
}

#[tokio::test]
async fn grantless_call_requests_scoped_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("scope=sellingpartnerapi%3A%3Anotifications"))
        .respond_with(token_response("Atza|grantless"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notifications/v1/destinations"))
        .and(header("x-amz-access-token", "Atza|grantless"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payload": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::grantless("eu")
        .with_credentials(AppCredentials::lwa("amzn1.application-oa2-client.e2e", "e2e-secret"));
    let client = builder(&server, config).build().unwrap();

    let response = client.call_api(CallRequest::new("getDestinations")).await.unwrap();
    assert_eq!(response.body, json!([]));
    assert!(client.grantless_access_token(GrantlessScope::Notifications).await.is_some());
    assert!(client.access_token().await.is_none());
}

#[tokio::test]
async fn rejected_token_is_replaced_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response("Atza|rotating"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sellers/v1/marketplaceParticipations"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": [{
                "code": "Unauthorized",
                "message": "Access to requested resource is denied."
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sellers/v1/marketplaceParticipations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payload": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = builder(&server, seller_config()).build().unwrap();
    let response = client.call_api(CallRequest::new("getMarketplaceParticipations")).await.unwrap();
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn lwa_rejection_surfaces_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "The request has an invalid grant parameter : refresh_token"
        })))
        .mount(&server)
        .await;

    let client = builder(&server, seller_config()).build().unwrap();
    let err = client.call_api(CallRequest::new("getMarketplaceParticipations")).await.unwrap_err();

    assert_eq!(err.code(), "invalid_grant");
    assert!(err.is_invalid_refresh_token());
    assert!(err.message().contains("refresh_token"));
}

#[tokio::test]
async fn upstream_errors_keep_code_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response("Atza|x"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders/v0/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"code": "InvalidInput", "message": "MarketplaceIds is required"}]
        })))
        .mount(&server)
        .await;

    let client = builder(&server, seller_config()).build().unwrap();
    let err = client.call_api(CallRequest::new("getOrders")).await.unwrap_err();

    assert_eq!(err.code(), "InvalidInput");
    assert_eq!(err.message(), "MarketplaceIds is required");
    assert!(!err.is_unauthorized());
}

#[tokio::test]
async fn signed_call_assumes_role_and_signs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response("Atza|signed"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("Action=AssumeRole"))
        .and(body_string_contains("RoleArn=arn%3Aaws%3Aiam%3A%3A123456789012%3Arole%2Fsp-api"))
        .and(|request: &Request| {
            request.headers.get("authorization").and_then(|v| v.to_str().ok()).map_or(false, |v| {
                v.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/")
                    && v.contains("/us-east-1/sts/aws4_request")
            })
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AssumeRoleResponse": {
                "AssumeRoleResult": {
                    "Credentials": {
                        "AccessKeyId": "ASIAE2E",
                        "SecretAccessKey": "role-secret",
                        "SessionToken": "role-session-token",
                        "Expiration": 4_102_444_800.0
                    }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sellers/v1/marketplaceParticipations"))
        .and(header("x-amz-security-token", "role-session-token"))
        .and(|request: &Request| {
            request.headers.get("authorization").and_then(|v| v.to_str().ok()).map_or(false, |v| {
                v.starts_with("AWS4-HMAC-SHA256 Credential=ASIAE2E/")
                    && v.contains("/us-east-1/execute-api/aws4_request")
                    && v.contains("x-amz-access-token")
            })
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payload": []})))
        .expect(2)
        .mount(&server)
        .await;

    let config = seller_config()
        .with_credentials(
            AppCredentials::lwa("amzn1.application-oa2-client.e2e", "e2e-secret").with_aws(
                "AKIDEXAMPLE",
                "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
                "arn:aws:iam::123456789012:role/sp-api",
            ),
        )
        .with_options(ClientOptions { sign_requests: true, ..ClientOptions::default() });
    let client = builder(&server, config).build().unwrap();

    for _ in 0..2 {
        client.call_api(CallRequest::new("getMarketplaceParticipations")).await.unwrap();
    }
    assert_eq!(client.role_credentials().await.unwrap().access_key_id, "ASIAE2E");
}

#[tokio::test]
async fn exchange_then_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=ANxyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "Atza|exchanged",
            "refresh_token": "Atzr|exchanged",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sellers/v1/marketplaceParticipations"))
        .and(header("x-amz-access-token", "Atza|exchanged"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payload": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::grantless("na")
        .with_credentials(AppCredentials::lwa("amzn1.application-oa2-client.e2e", "e2e-secret"));
    let client = builder(&server, config).build().unwrap();

    let tokens = client.exchange("ANxyz").await.unwrap();
    assert_eq!(tokens.refresh_token.as_deref(), Some("Atzr|exchanged"));
    assert_eq!(client.refresh_token().await.as_deref(), Some("Atzr|exchanged"));

    client.call_api(CallRequest::new("getMarketplaceParticipations")).await.unwrap();
}

#[tokio::test]
async fn oversized_token_lifetime_does_not_break_the_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "Atza|forever",
            "token_type": "bearer",
            "expires_in": 9_000_000_000_000_000_i64
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sellers/v1/marketplaceParticipations"))
        .and(header("x-amz-access-token", "Atza|forever"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payload": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = builder(&server, seller_config()).build().unwrap();

    for _ in 0..2 {
        let token = client.refresh_access_token(None).await.unwrap();
        assert_eq!(token.token, "Atza|forever");
        assert!(token.expires_at.is_some());
    }
    client.call_api(CallRequest::new("getMarketplaceParticipations")).await.unwrap();
}
