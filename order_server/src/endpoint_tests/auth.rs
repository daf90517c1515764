use std::collections::HashMap;

use actix_web::http::StatusCode;
use chrono::{Days, Utc};
use rsa::traits::PublicKeyParts;
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock,
    MockServer,
    ResponseTemplate,
};

use super::helpers::{
    bearer,
    get_auth_config,
    get_request,
    issue_token,
    issue_token_with_key_id,
    signing_key,
    standard_claims,
    test_verifier,
    TEST_KEY_ID,
    TEST_SUBJECT,
};
use crate::{
    auth::TokenVerifier,
    errors::AuthError,
    routes::external,
};

fn tomorrow() -> chrono::DateTime<Utc> {
    Utc::now() + Days::new(1)
}

#[actix_web::test]
async fn verified_claims() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(standard_claims(&["read:orders", "create:orders"], true), tomorrow());
    let claims = test_verifier().verify(&token).await.expect("Token should be valid");
    assert_eq!(claims.subject.as_deref(), Some(TEST_SUBJECT));
    assert_eq!(claims.permissions, vec!["read:orders".to_string(), "create:orders".to_string()]);
    assert_eq!(claims.email_verified, Some(json!(true)));
    assert!(claims.is_email_verified());
    assert!(claims.expiry.is_some());
}

#[actix_web::test]
async fn email_claim_must_use_the_configured_namespace() {
    let _ = env_logger::try_init().ok();
    let mut claims = standard_claims(&["create:orders"], true);
    let custom = claims.as_object_mut().unwrap();
    custom.remove(&get_auth_config().email_verified_claim);
    custom.insert("email_verified".into(), json!(true));
    let claims = test_verifier().verify(&issue_token(claims, tomorrow())).await.unwrap();
    assert_eq!(claims.email_verified, None);
    assert!(!claims.is_email_verified());
}

#[actix_web::test]
async fn single_string_audience() {
    let _ = env_logger::try_init().ok();
    let mut claims = standard_claims(&[], true);
    claims["aud"] = json!(get_auth_config().audience);
    assert!(test_verifier().verify(&issue_token(claims, tomorrow())).await.is_ok());
}

#[actix_web::test]
async fn wrong_audience() {
    let _ = env_logger::try_init().ok();
    let mut claims = standard_claims(&["read:orders"], true);
    claims["aud"] = json!(["https://some-other-api.example.com"]);
    let err = test_verifier().verify(&issue_token(claims, tomorrow())).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidAudience(_)), "was: {err}");
}

#[actix_web::test]
async fn wrong_issuer() {
    let _ = env_logger::try_init().ok();
    let mut claims = standard_claims(&["read:orders"], true);
    claims["iss"] = json!("https://evil.example.com/");
    let err = test_verifier().verify(&issue_token(claims, tomorrow())).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidIssuer(_)), "was: {err}");
}

#[actix_web::test]
async fn unknown_key_id() {
    let _ = env_logger::try_init().ok();
    let token = issue_token_with_key_id(standard_claims(&[], true), tomorrow(), "rotated-away");
    let err = test_verifier().verify(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::UnknownSigningKey(_)), "was: {err}");
}

#[actix_web::test]
async fn garbage_token() {
    let _ = env_logger::try_init().ok();
    let err = test_verifier().verify("not-a-jwt").await.unwrap_err();
    assert!(matches!(err, AuthError::PoorlyFormattedToken(_)), "was: {err}");
}

#[actix_web::test]
async fn rejected_headers() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(standard_claims(&[], true), tomorrow());
    for header in [format!("Basic {token}"), token.clone(), "Bearer not-a-jwt".to_string()] {
        let (status, body) = get_request(&header, "/external", |cfg| {
            cfg.service(external);
        })
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{header}");
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["success"], json!(false));
    }
    let (status, _) = get_request(&bearer(&token), "/external", |cfg| {
        cfg.service(external);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
}

fn jwks() -> Value {
    let key = signing_key().to_public_key();
    json!({
        "keys": [
            { "kty": "EC", "kid": "not-rsa", "crv": "P-256", "x": "AA", "y": "AA" },
            {
                "kty": "RSA",
                "kid": TEST_KEY_ID,
                "use": "sig",
                "alg": "RS256",
                "n": base64::encode_config(key.n().to_bytes_be(), base64::URL_SAFE_NO_PAD),
                "e": base64::encode_config(key.e().to_bytes_be(), base64::URL_SAFE_NO_PAD),
            }
        ]
    })
}

#[actix_web::test]
async fn signing_keys_are_fetched_once() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks()))
        .expect(1)
        .mount(&server)
        .await;
    let verifier = TokenVerifier::new(get_auth_config())
        .unwrap()
        .with_jwks_url(format!("{}/.well-known/jwks.json", server.uri()));
    let token = issue_token(standard_claims(&["read:orders"], true), tomorrow());
    assert!(verifier.verify(&token).await.is_ok());
    assert!(verifier.verify(&token).await.is_ok());
    // Unknown key ids do not trigger another fetch straight away
    let token = issue_token_with_key_id(standard_claims(&[], true), tomorrow(), "rotated-away");
    assert!(matches!(verifier.verify(&token).await, Err(AuthError::UnknownSigningKey(_))));
}

#[actix_web::test]
async fn unreachable_key_server() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let verifier = TokenVerifier::new(get_auth_config())
        .unwrap()
        .with_jwks_url(format!("{}/.well-known/jwks.json", server.uri()));
    let token = issue_token(standard_claims(&[], true), tomorrow());
    assert!(matches!(verifier.verify(&token).await, Err(AuthError::KeyFetch(_))));
}

#[actix_web::test]
async fn failed_key_fetches_are_throttled() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let keys = HashMap::from([(TEST_KEY_ID.to_string(), signing_key().to_public_key())]);
    let verifier = TokenVerifier::with_keys(get_auth_config(), keys)
        .with_jwks_url(format!("{}/.well-known/jwks.json", server.uri()));
    let first = issue_token_with_key_id(standard_claims(&[], true), tomorrow(), "made-up-1");
    assert!(matches!(verifier.verify(&first).await, Err(AuthError::KeyFetch(_))));
    let second = issue_token_with_key_id(standard_claims(&[], true), tomorrow(), "made-up-2");
    assert!(matches!(verifier.verify(&second).await, Err(AuthError::UnknownSigningKey(_))));
    // Cached keys keep working while the key server is down
    let token = issue_token(standard_claims(&["read:orders"], true), tomorrow());
    assert!(verifier.verify(&token).await.is_ok());
}
