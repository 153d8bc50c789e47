pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::portfolio::handlers as portfolio;
use crate::render::handlers as render;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Element palette
        .route("/api/v1/elements", get(render::handle_list_elements))
        // Extraction
        .route("/api/v1/resumes/parse", post(extraction::handle_parse_resume))
        // Rendering
        .route("/api/v1/portfolios/preview", post(render::handle_preview))
        .route("/api/v1/portfolios/export", post(render::handle_export))
        // Saved portfolios
        .route("/api/v1/portfolios", post(portfolio::handle_save_portfolio))
        .route("/api/v1/portfolios/:id", get(portfolio::handle_get_portfolio))
        .route(
            "/api/v1/portfolios/:id/export",
            get(portfolio::handle_export_portfolio),
        )
        .route(
            "/api/v1/users/:user_id/portfolio",
            get(portfolio::handle_user_portfolio),
        )
        .route(
            "/api/v1/portfolios/:id/elements",
            post(portfolio::handle_place_element),
        )
        .route(
            "/api/v1/portfolios/:id/elements/:element_id",
            patch(portfolio::handle_update_element).delete(portfolio::handle_remove_element),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::extraction::{KeyRing, ResumeExtractor, VisionModel};
    use crate::llm_client::VisionError;
    use crate::portfolio::store::memory::MemoryPortfolioStore;

    /// Always answers with the same reply text.
    struct CannedModel(&'static str);

    #[async_trait]
    impl VisionModel for CannedModel {
        async fn complete(
            &self,
            _api_key: &str,
            _prompt: &str,
            _images: &[String],
        ) -> Result<String, VisionError> {
            Ok(self.0.to_string())
        }
    }

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            redis_url: None,
            vision_api_keys: KeyRing::parse("test-key"),
            vision_model: "test-model".to_string(),
            vision_base_url: "http://localhost".to_string(),
            site_url: None,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn app(reply: &'static str) -> Router {
        let config = test_config();
        let extractor = ResumeExtractor::new(
            Arc::new(CannedModel(reply)),
            config.vision_api_keys.clone(),
            None,
        );
        build_router(AppState {
            store: Arc::new(MemoryPortfolioStore::default()),
            extractor: Arc::new(extractor),
            config,
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_and_elements() {
        let app = app("{}");
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vision_model"], "test-model");

        let (status, body) = send(&app, Method::GET, "/api/v1/elements", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["elements"].as_array().map(Vec::len), Some(6));
        assert_eq!(body["elements"][3]["name"], "Statistics");
    }

    #[tokio::test]
    async fn test_parse_resume_returns_normalized_data() {
        let app = app("```json\n{\"name\": \"Ada\", \"skills\": [\"Math\",]}\n```");
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/resumes/parse",
            Some(json!({"images": ["data:image/png;base64,QUJD"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Ada");
        assert_eq!(body["data"]["skills"], json!(["Math"]));
        assert_eq!(body["data"]["experience"], json!([]));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/resumes/parse",
            Some(json!({"images": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_model_reply_is_422() {
        let app = app("I cannot help with that.");
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/resumes/parse",
            Some(json!({"images": ["QUJD"]})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "MALFORMED_RESPONSE");
    }

    #[tokio::test]
    async fn test_preview_returns_editable_tree() {
        let app = app("{}");
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/portfolios/preview",
            Some(json!({"data": {"name": "Ada"}, "editable": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tree"]["kind"], "element");
        assert!(body["tree"].to_string().contains("data-drop-zone"));

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/portfolios/preview",
            Some(json!({"data": "not an object"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_save_place_update_remove_and_export() {
        let app = app("{}");
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/portfolios",
            Some(json!({"user_id": "u1", "data": {"name": "Ada Lovelace", "skills": ["Math"]}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["portfolio_id"].as_str().unwrap().to_string();

        let (_, body) = send(&app, Method::GET, "/api/v1/users/u1/portfolio", None).await;
        assert_eq!(body["has_portfolio"], true);
        assert_eq!(body["portfolio_id"], id.as_str());

        let (status, element) = send(
            &app,
            Method::POST,
            &format!("/api/v1/portfolios/{id}/elements"),
            Some(json!({"user_id": "u1", "type": "progress", "section": "skills"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let element_id = element["id"].as_str().unwrap().to_string();
        assert_eq!(element["props"]["items"].as_array().map(Vec::len), Some(3));

        let (status, updated) = send(
            &app,
            Method::PATCH,
            &format!("/api/v1/portfolios/{id}/elements/{element_id}"),
            Some(json!({"user_id": "u1", "props": {"items": [{"label": "Rust", "progress": 140}]}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["props"]["items"][0]["progress"], 100);

        let (_, saved) = send(&app, Method::GET, &format!("/api/v1/portfolios/{id}"), None).await;
        assert_eq!(saved["data"]["customElements"][0]["id"], element_id.as_str());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/portfolios/{id}/export"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"ada-lovelace-portfolio.html\""
        );
        let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(html.to_vec()).unwrap();
        assert!(html.contains(&format!("data-element-id=\"{element_id}\"")));

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/api/v1/portfolios/{id}/elements/{element_id}?user_id=u1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, saved) = send(&app, Method::GET, &format!("/api/v1/portfolios/{id}"), None).await;
        assert_eq!(saved["data"]["customElements"], json!([]));
    }

    #[tokio::test]
    async fn test_other_users_cannot_edit() {
        let app = app("{}");
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/v1/portfolios",
            Some(json!({"user_id": "owner", "data": {}})),
        )
        .await;
        let id = body["portfolio_id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/portfolios/{id}/elements"),
            Some(json!({"user_id": "intruder", "type": "wizard", "section": "about"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/portfolios",
            Some(json!({"user_id": "intruder", "portfolio_id": id, "data": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
