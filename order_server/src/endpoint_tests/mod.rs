mod auth;
mod helpers;
mod mocks;

mod misc {
    use actix_web::{http::StatusCode, web};
    use serde_json::{json, Value};

    use super::helpers::{get_auth_config, get_request};
    use crate::routes::{auth_config, health};

    #[actix_web::test]
    async fn health_endpoint() {
        let (status, body) = get_request("", "/health", |cfg| {
            cfg.service(health);
        })
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "👍️\n");
    }

    #[actix_web::test]
    async fn auth_config_endpoint() {
        let (status, body) = get_request("", "/auth_config.json", |cfg| {
            cfg.service(auth_config).app_data(web::Data::new(get_auth_config()));
        })
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            body,
            json!({
                "domain": "pizza42.example.com",
                "clientId": "spa-client-id",
                "audience": "https://orders.pizza42.example.com"
            })
        );
    }
}
