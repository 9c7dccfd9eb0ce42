//! HTTP REST API routes

mod character_routes;
mod error;
mod house_routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::infrastructure::state::AppState;

pub use error::{ApiError, ApiResult};

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // House routes
        .route(
            "/houses",
            post(house_routes::create_house).get(house_routes::list_houses),
        )
        .route(
            "/houses/{id}",
            get(house_routes::get_house)
                .put(house_routes::update_house)
                .delete(house_routes::delete_house),
        )
        // Character routes
        .route(
            "/characters",
            post(character_routes::create_character).get(character_routes::list_characters),
        )
        .route(
            "/characters/{id}",
            get(character_routes::get_character)
                .put(character_routes::update_character)
                .delete(character_routes::delete_character),
        )
}

/// Build the full application router with middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{SteppingClock, UuidV4Generator};
    use crate::infrastructure::state::Repositories;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::from_repositories(
            Repositories::in_memory(),
            Arc::new(SteppingClock::default()),
            Arc::new(UuidV4Generator),
        );
        create_app(Arc::new(state))
    }

    async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        body: Body,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));
        send_raw(app, method, uri, body).await
    }

    async fn create(app: &Router, uri: &str, body: Value) -> String {
        let (status, json) = send(app, Method::POST, uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_deleting_lord_clears_both_houses() {
        let app = app();
        let lord = create(
            &app,
            "/characters",
            json!({ "name": "Patrick Chagas", "tv_series": ["S1", "S2"] }),
        )
        .await;
        let mut houses = Vec::new();
        for name in ["House A", "House B"] {
            houses.push(
                create(
                    &app,
                    "/houses",
                    json!({
                        "name": name,
                        "region": "sao paulo",
                        "foundation_year": "2023",
                        "current_lord": lord,
                    }),
                )
                .await,
            );
        }

        let (status, _) = send(&app, Method::DELETE, &format!("/characters/{lord}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        for id in houses {
            let (status, house) = send(&app, Method::GET, &format!("/houses/{id}"), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(house["current_lord"], "");
        }
        let (status, _) = send(&app, Method::GET, &format!("/characters/{lord}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_house_name_is_conflict() {
        let app = app();
        let body = json!({ "name": "House A", "region": "sao paulo", "foundation_year": "2023" });
        let first = create(&app, "/houses", body.clone()).await;

        let (status, error) = send(&app, Method::POST, "/houses", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["http_code"], 409);

        let (status, page) = send(&app, Method::GET, "/houses?name=House%20A", None).await;
        assert_eq!(status, StatusCode::OK);
        let data = page["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["id"], first.as_str());
    }

    #[tokio::test]
    async fn test_invalid_payload_lists_violations() {
        let app = app();
        let (status, error) = send(
            &app,
            Method::POST,
            "/houses",
            Some(json!({ "name": "Ab", "region": "sao paulo" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["message"], "invalid_payload");
        let fields: Vec<_> = error["detail"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "foundation_year"]);
        assert_eq!(error["detail"][0]["rule"], "min");
        assert_eq!(error["detail"][0]["param"], 3);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_bad_request() {
        let app = app();
        let (status, error) =
            send_raw(&app, Method::POST, "/characters", Body::from("{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["message"], "problem to decode your input");
        assert!(error.get("detail").is_none());
    }

    #[tokio::test]
    async fn test_path_ids_are_checked() {
        let app = app();
        let (status, error) = send(&app, Method::GET, "/houses/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["message"], "invalid house id");

        let missing = uuid::Uuid::new_v4();
        let (status, _) = send(&app, Method::GET, &format!("/characters/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_house_lifecycle() {
        let app = app();
        let id = create(
            &app,
            "/houses",
            json!({ "name": "House Tully", "region": "Riverlands", "foundation_year": "2023" }),
        )
        .await;

        let (status, house) = send(
            &app,
            Method::PUT,
            &format!("/houses/{id}"),
            Some(json!({ "name": "House Tully", "region": "Riverrun", "foundation_year": "2023" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(house["region"], "Riverrun");
        assert!(!house["updated_at"].is_null());
        assert!(house.get("deleted_at").is_none());

        let uri = format!("/houses/{id}");
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, page) = send(&app, Method::GET, "/houses", None).await;
        assert!(page["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_house_list_echoes_normalised_window() {
        let app = app();
        let (_, page) = send(&app, Method::GET, "/houses?limit=0&offset=4", None).await;
        assert_eq!(page["limit"], 10);
        assert_eq!(page["offset"], 4);

        let (_, page) = send(&app, Method::GET, "/houses?limit=500", None).await;
        assert_eq!(page["limit"], 50);
        assert_eq!(page["offset"], 0);
    }

    #[tokio::test]
    async fn test_malformed_house_query_is_json_bad_request() {
        let app = app();
        for uri in ["/houses?limit=abc", "/houses?limit=-1", "/houses?offset=1.5"] {
            let (status, error) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(error["http_code"], 400, "{uri}");
            assert_eq!(error["message"], "invalid query string", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_character_update_and_list() {
        let app = app();
        let id = create(
            &app,
            "/characters",
            json!({ "name": "Arya Stark", "tv_series": ["S1"] }),
        )
        .await;

        let (status, character) = send(
            &app,
            Method::PUT,
            &format!("/characters/{id}"),
            Some(json!({ "name": "Arya Stark", "tv_series": ["S1", "S2"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(character["tv_series"], json!(["S1", "S2"]));

        let (status, list) = send(&app, Method::GET, "/characters", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }
}
