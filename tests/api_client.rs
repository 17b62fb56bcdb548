//! HTTP client behaviour against an in-process axum server.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::routing::{delete, get, patch};
use axum::Json;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use qcdesk::api::ApiClient;
use qcdesk::board::EntryBoard;
use qcdesk::errors::ApiError;
use qcdesk::form::IpqcPatch;
use qcdesk::model::{EntryFilter, EntryKind, Shift};

async fn serve(app: Router) -> ApiClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ApiClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap()
}

fn filter() -> EntryFilter {
    EntryFilter::new("2025-03-04", Shift::S1)
}

fn entry(id: &str, before: u64) -> Value {
    json!({
        "id": id,
        "productId": "p1",
        "product": { "name": "O-Ring", "computerCode": "OR-12", "size": "12mm" },
        "date": "2025-03-04T00:00:00.000Z",
        "shift": "S1",
        "beforeIpqc": before,
        "afterIpqc": 10,
        "onGoingPostcured": 10,
        "afterPostcured": 5
    })
}

mod envelopes {
    use super::*;

    #[tokio::test]
    async fn test_bare_array() {
        let app = Router::new().route("/entries", get(|| async { Json(json!([entry("e1", 40)])) }));
        let client = serve(app).await;
        let entries = client.list_entries(EntryKind::Ipqc, &filter()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].before_ipqc, 40);
    }

    #[tokio::test]
    async fn test_items_object() {
        let app = Router::new().route(
            "/entries",
            get(|| async { Json(json!({ "items": [entry("e1", 1), entry("e2", 2)], "total": 2 })) }),
        );
        let client = serve(app).await;
        let entries = client.list_entries(EntryKind::Ipqc, &filter()).await.unwrap();
        assert_eq!(entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), ["e1", "e2"]);
    }

    #[tokio::test]
    async fn test_data_object() {
        let app = Router::new().route("/entries", get(|| async { Json(json!({ "data": [entry("e9", 3)] })) }));
        let client = serve(app).await;
        let entries = client.list_entries(EntryKind::Oqc, &filter()).await.unwrap();
        assert_eq!(entries[0].id, "e9");
    }
}

mod errors {
    use super::*;

    #[tokio::test]
    async fn test_401_is_unauthorized() {
        let app = Router::new().route(
            "/entries",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "error": "expired" }))) }),
        );
        let client = serve(app).await;
        let err = client.list_entries(EntryKind::Ipqc, &filter()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_403_is_forbidden() {
        let app = Router::new().route("/users", get(|| async { StatusCode::FORBIDDEN }));
        let client = serve(app).await;
        let err = client.list_users().await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[tokio::test]
    async fn test_status_message_comes_from_json_error() {
        let app = Router::new().route(
            "/entries",
            get(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "error": "Product is inactive" })),
                )
            }),
        );
        let client = serve(app).await;
        match client.list_entries(EntryKind::Ipqc, &filter()).await.unwrap_err() {
            ApiError::Status { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Product is inactive");
            }
            other => panic!("Expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_html_body_is_rejected() {
        let app = Router::new().route("/entries", get(|| async { Html("<html>login</html>") }));
        let client = serve(app).await;
        match client.list_entries(EntryKind::Ipqc, &filter()).await.unwrap_err() {
            ApiError::UnexpectedContentType { content_type, url } => {
                assert!(content_type.starts_with("text/html"));
                assert!(url.ends_with("/entries"));
            }
            other => panic!("Expected UnexpectedContentType, got {:?}", other),
        }
    }
}

mod endpoints {
    use super::*;

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let app = Router::new().route(
            "/entries",
            get(|headers: HeaderMap| async move {
                match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                    Some("Bearer tok-1") => Json(json!([])).into_response(),
                    _ => StatusCode::UNAUTHORIZED.into_response(),
                }
            }),
        );
        let client = serve(app).await;

        let anonymous = client.clone();
        assert!(anonymous.list_entries(EntryKind::Ipqc, &filter()).await.is_err());

        let authed = client.with_token(Some("tok-1".into()));
        assert!(authed.list_entries(EntryKind::Ipqc, &filter()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ipqc_summary_falls_back_to_legacy_path() {
        let app = Router::new().route(
            "/ipqc/summary",
            get(|| async { Json(json!({ "totalBeforeIpqc": 120, "totalAfterIpqc": 80 })) }),
        );
        let client = serve(app).await;
        let summary = client.ipqc_summary(&filter()).await.unwrap();
        assert_eq!(summary.total_before_ipqc, 120);
        assert_eq!(summary.total_after_ipqc, 80);
    }

    #[tokio::test]
    async fn test_previous_qty() {
        let app = Router::new().route(
            "/entries/previous-qty",
            get(|| async {
                Json(json!({
                    "found": true,
                    "beforeIpqc": 30,
                    "afterIpqc": 12,
                    "afterPostcured": 4,
                    "previousDate": "2025-03-03",
                    "previousShift": "S3"
                }))
            }),
        );
        let client = serve(app).await;
        let prev = client.previous_qty("p1", "2025-03-04", Shift::S1).await.unwrap();
        assert!(prev.found);
        assert_eq!(prev.before_ipqc, 30);
        assert_eq!(prev.after_postcured, 4);
        assert_eq!(prev.previous_shift.as_deref(), Some("S3"));
    }
}

mod boards {
    use super::*;

    #[tokio::test]
    async fn test_failed_save_rolls_back() {
        let app = Router::new()
            .route("/entries", get(|| async { Json(json!([entry("e1", 40)])) }))
            .route(
                "/entries/{id}",
                patch(|| async {
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" })))
                }),
            );
        let client = serve(app).await;
        let mut board = EntryBoard::new(client, EntryKind::Ipqc, filter());
        board.load().await.unwrap();

        let patch = IpqcPatch {
            before_ipqc: 1,
            after_ipqc: 2,
            on_going_postcured: 2,
            after_postcured: 3,
            note: "changed".into(),
        };
        let err = board.save_ipqc("e1", &patch).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));

        let row = board.get("e1").unwrap();
        assert_eq!(row.before_ipqc, 40);
        assert_eq!(row.after_postcured, 5);
        assert_eq!(row.note, None);
    }

    #[tokio::test]
    async fn test_delete_with_no_content() {
        let app = Router::new()
            .route("/entries", get(|| async { Json(json!([entry("e1", 1), entry("e2", 2)])) }))
            .route("/entries/{id}", delete(|| async { StatusCode::NO_CONTENT }));
        let client = serve(app).await;
        let mut board = EntryBoard::new(client, EntryKind::Ipqc, filter());
        board.load().await.unwrap();

        board.delete("e1").await.unwrap();
        assert!(board.get("e1").is_none());
        assert_eq!(board.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_with_empty_text_body() {
        let app = Router::new().route(
            "/entries/{id}",
            delete(|| async { (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], "") }),
        );
        let client = serve(app).await;
        client.delete_entry("e1").await.unwrap();
    }
}
