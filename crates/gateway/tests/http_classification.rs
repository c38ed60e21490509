//! Provider clients against a local HTTP server
//!
//! Verifies request shape (paths, auth headers) and how each HTTP outcome is
//! classified into `ProviderError`.

use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{TimeZone, Utc};
use priceguard_clock::ManualClock;
use priceguard_core::{Credential, PromotionId, ProviderId};
use priceguard_gateway::{ClientFactory, GatewayConfig};
use priceguard_ports::{ProviderClient, ProviderError};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(base_url: &str, provider: ProviderId) -> Arc<dyn ProviderClient> {
    let _ = env_logger::try_init();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap());
    let mut config = GatewayConfig::with_base_url(base_url);
    config.request_timeout_secs = 2;
    config.page_size = 2;
    ClientFactory::new(config, clock).unwrap().create(provider)
}

fn ozon_credential() -> Credential {
    Credential::ozon("4242", "ozon-secret")
}

fn ozon_authorized(headers: &HeaderMap) -> bool {
    headers.get("Client-Id").is_some_and(|v| v == "4242")
        && headers.get("Api-Key").is_some_and(|v| v == "ozon-secret")
}

async fn ozon_actions(headers: HeaderMap) -> impl IntoResponse {
    if !ozon_authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "bad key"})));
    }
    (
        StatusCode::OK,
        Json(json!({"result": [
            {"id": 10, "title": "Autumn", "action_type": "DISCOUNT",
             "date_start": "2024-09-01T00:00:00Z", "date_end": "2024-09-30T00:00:00Z",
             "participating_products_count": 3, "potential_products_count": 40,
             "is_participating": true, "discount_value": 12.5},
            {"id": 11, "title": "Stock clearance", "action_type": "STOCK_DISCOUNT",
             "date_start": "2024-09-05", "date_end": "",
             "participating_products_count": 0, "potential_products_count": 8,
             "is_participating": false}
        ]})),
    )
}

async fn ozon_hot_sales(headers: HeaderMap) -> impl IntoResponse {
    if !ozon_authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({"result": [
            {"hotsale_id": 7, "title": "Hot Friday", "date_start": "2024-09-13", "date_end": "2024-09-13", "is_participating": true}
        ]})),
    )
}

async fn ozon_action_products(Json(body): Json<Value>) -> Json<Value> {
    // Three products served in pages of two
    let offset = body["offset"].as_u64().unwrap_or(0);
    let products: Vec<Value> = (0..3u64)
        .skip(offset as usize)
        .take(2)
        .map(|i| json!({"id": 100 + i, "price": 1000, "action_price": 900, "stock": i}))
        .collect();
    Json(json!({"result": {"products": products, "total": 3}}))
}

fn ozon_router() -> Router {
    Router::new()
        .route("/v1/actions", get(ozon_actions))
        .route("/v1/actions/hotsales/list", post(ozon_hot_sales))
        .route("/v1/actions/products", post(ozon_action_products))
        .route(
            "/v3/product/info/stocks",
            post(|headers: HeaderMap| async move {
                if ozon_authorized(&headers) {
                    (StatusCode::OK, Json(json!({"items": []})))
                } else {
                    (StatusCode::FORBIDDEN, Json(json!({"message": "denied"})))
                }
            }),
        )
}

/// Actions and hot sales are merged into one normalized snapshot
#[tokio::test]
async fn test_ozon_fetch_normalizes_actions_and_hot_sales() {
    let base = serve(ozon_router()).await;
    let client = client_for(&base, ProviderId::Ozon);

    let snapshot = client.fetch_promotions(&ozon_credential()).await.unwrap();

    assert_eq!(snapshot.provider(), ProviderId::Ozon);
    assert_eq!(snapshot.len(), 3);
    let autumn = snapshot.get(&PromotionId::from(10)).unwrap();
    assert_eq!(autumn.participating_product_count, 3);
    assert!(autumn.is_participating);
    let clearance = snapshot.get(&PromotionId::from(11)).unwrap();
    assert_eq!(clearance.end_time, None);
    let hot = snapshot.get(&PromotionId::from("hotsale-7")).unwrap();
    assert_eq!(hot.kind, "HOT_SALE");
    assert_eq!(
        snapshot.fetched_at(),
        Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
    );
}

/// Product listings are paged until a short page
#[tokio::test]
async fn test_ozon_products_paged() {
    let base = serve(ozon_router()).await;
    let client = client_for(&base, ProviderId::Ozon);

    let products = client
        .fetch_promotion_products(&ozon_credential(), &PromotionId::from(10))
        .await
        .unwrap();

    let ids: Vec<_> = products.iter().map(|p| p.product_id.as_str()).collect();
    assert_eq!(ids, vec!["100", "101", "102"]);
}

/// Rejected keys are InvalidCredential on fetch and `false` on validation
#[tokio::test]
async fn test_ozon_invalid_credentials() {
    let base = serve(ozon_router()).await;
    let client = client_for(&base, ProviderId::Ozon);
    let wrong = Credential::ozon("4242", "stale");

    assert_eq!(
        client.fetch_promotions(&wrong).await.unwrap_err(),
        ProviderError::InvalidCredential
    );
    assert!(!client.validate_credential(&wrong).await.unwrap());
    assert!(client.validate_credential(&ozon_credential()).await.unwrap());
    // Keys for another marketplace never reach the wire
    assert_eq!(
        client
            .fetch_promotions(&Credential::wildberries("x"))
            .await
            .unwrap_err(),
        ProviderError::InvalidCredential
    );
}

fn status_router(status: StatusCode, body: &'static str) -> Router {
    let handler = move || async move {
        let mut headers = HeaderMap::new();
        if status == StatusCode::TOO_MANY_REQUESTS {
            headers.insert("retry-after", "17".parse().unwrap());
        }
        (status, headers, body)
    };
    Router::new()
        .route("/v1/actions", get(handler.clone()))
        .route("/api/v1/calendar/promotions", get(handler.clone()))
        .route("/ping", get(handler))
}

/// Status codes map onto the provider error taxonomy
#[tokio::test]
async fn test_status_classification() {
    let cases = [
        (StatusCode::UNAUTHORIZED, "{}"),
        (StatusCode::FORBIDDEN, "{}"),
        (StatusCode::TOO_MANY_REQUESTS, "{}"),
        (StatusCode::SERVICE_UNAVAILABLE, "{}"),
        (StatusCode::BAD_REQUEST, r#"{"message":"bad filter"}"#),
        (StatusCode::REQUEST_TIMEOUT, "{}"),
        (StatusCode::OK, "not json"),
    ];

    for (status, body) in cases {
        let base = serve(status_router(status, body)).await;
        let ozon = client_for(&base, ProviderId::Ozon);
        let wb = client_for(&base, ProviderId::Wildberries);

        let ozon_err = ozon.fetch_promotions(&ozon_credential()).await.unwrap_err();
        let wb_err = wb
            .fetch_promotions(&Credential::wildberries("wb-key"))
            .await
            .unwrap_err();

        for err in [ozon_err, wb_err] {
            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    assert_eq!(err, ProviderError::InvalidCredential, "{}", status)
                }
                StatusCode::TOO_MANY_REQUESTS => assert_eq!(
                    err,
                    ProviderError::RateLimitedByProvider {
                        retry_after: Some(Duration::from_secs(17))
                    }
                ),
                _ => assert!(
                    matches!(err, ProviderError::Transient(_)),
                    "{} gave {:?}",
                    status,
                    err
                ),
            }
        }
    }
}

/// Nothing listening is a transient network failure
#[tokio::test]
async fn test_connection_refused_is_transient() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr), ProviderId::Wildberries);
    let err = client
        .fetch_promotions(&Credential::wildberries("wb-key"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Transient(_)));
    assert!(err.is_retryable());
}

/// Wildberries calendar: auth header, auto-only filter, paged nomenclatures
#[tokio::test]
async fn test_wildberries_calendar() {
    let app = Router::new()
        .route(
            "/api/v1/calendar/promotions",
            get(|headers: HeaderMap, Query(query): Query<HashMap<String, String>>| async move {
                assert_eq!(query.get("allPromo").map(String::as_str), Some("true"));
                if headers.get("authorization").is_none_or(|v| v != "wb-key") {
                    return (StatusCode::UNAUTHORIZED, Json(json!({})));
                }
                (
                    StatusCode::OK,
                    Json(json!({"data": {"promotions": [
                        {"id": 1, "name": "Auto sale", "type": "auto",
                         "dateStart": "2024-09-01T00:00:00Z", "dateEnd": "2024-09-10T00:00:00Z",
                         "inPromoActionTotal": 5},
                        {"id": 2, "name": "Regular", "type": "regular",
                         "dateStart": "2024-09-02T00:00:00Z", "dateEnd": "2024-09-03T00:00:00Z"}
                    ]}})),
                )
            }),
        )
        .route(
            "/api/v1/calendar/promotions/nomenclatures",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                assert_eq!(query.get("promotionID").map(String::as_str), Some("1"));
                let offset: u64 = query.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);
                let items: Vec<Value> = (0..3u64)
                    .skip(offset as usize)
                    .take(2)
                    .map(|i| json!({"id": 500 + i, "price": 200, "planPrice": 150, "inAction": true}))
                    .collect();
                Json(json!({"data": {"nomenclatures": items}}))
            }),
        )
        .route("/ping", get(|| async { Json(json!({"TS": "2024-09-01T12:00:00Z", "Status": "OK"})) }));

    let base = serve(app).await;
    let client = client_for(&base, ProviderId::Wildberries);
    let cred = Credential::wildberries("wb-key");

    let snapshot = client.fetch_promotions(&cred).await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.promotions()[0].participating_product_count, 5);

    let products = client
        .fetch_promotion_products(&cred, &PromotionId::from(1))
        .await
        .unwrap();
    assert_eq!(products.len(), 3);

    assert!(client.validate_credential(&cred).await.unwrap());
    assert_eq!(
        client
            .fetch_promotions(&Credential::wildberries("other"))
            .await
            .unwrap_err(),
        ProviderError::InvalidCredential
    );
}
