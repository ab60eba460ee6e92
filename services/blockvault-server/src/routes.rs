//! HTTP routes
//!
//! The analyze surface is deliberately thin: validate the input, hand it to
//! the pipeline, map the terminal error kinds onto status codes. Everything
//! interesting happens below this layer.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use blockvault_extraction::{ExtractError, ExtractionReport, Extractor};
use blockvault_types::{SchemaVariant, TxRecord, WalletAddress};

/// Shared application state
pub struct AppState {
    pub extractor: Extractor,
}

/// Build the service router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub address: String,
    #[serde(default)]
    pub transactions: Vec<TxRecord>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub data: ExtractionReport,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub schema: SchemaVariant,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        schema: state.extractor.schema(),
    })
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let address = WalletAddress::new(request.address).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;

    match state.extractor.extract(&address, &request.transactions).await {
        Ok(report) => Ok(Json(AnalyzeResponse {
            success: true,
            data: report,
        })),
        Err(err) => {
            let status = match &err {
                ExtractError::ExhaustedRetries { .. } => StatusCode::BAD_GATEWAY,
                ExtractError::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
                ExtractError::NoAttemptsConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((status, Json(ErrorResponse::new(err.to_string()))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use blockvault_extraction::ExtractorConfig;
    use blockvault_llm::{ScriptedProvider, ScriptedReply};
    use serde_json::{json, Value};
    use std::time::Duration;

    const VALID_SCORED: &str = r#"{
        "reliabilityScore": 850,
        "riskLevel": "Low",
        "proofTargetBlock": "0x12a0234",
        "proofStorageSlot": "0x0000",
        "reasoningSummary": "User repaid a loan on Aave."
    }"#;

    fn server_with(primary: Vec<ScriptedReply>, fallback: Vec<ScriptedReply>) -> TestServer {
        let config = ExtractorConfig {
            retry_delay: Duration::from_millis(1),
            ..Default::default()
        };
        let extractor = Extractor::new(
            Arc::new(ScriptedProvider::new("primary", primary)),
            Arc::new(ScriptedProvider::new("fallback", fallback)),
            config,
        );
        let state = Arc::new(AppState { extractor });
        TestServer::new(create_router(state)).expect("test server")
    }

    #[tokio::test]
    async fn test_health() {
        let server = server_with(vec![], vec![]);

        let response = server.get("/health").await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["schema"], "scored");
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let server = server_with(
            vec![ScriptedReply::Content(VALID_SCORED.to_string())],
            vec![],
        );

        let response = server
            .post("/analyze")
            .json(&json!({
                "address": "0x123abc456def78901234567890abcdef12345678",
                "transactions": [{"method": "repayLoan", "to": "AavePool"}]
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["result"]["reliabilityScore"], 850);
        assert_eq!(body["data"]["provider"], "primary");
    }

    #[tokio::test]
    async fn test_analyze_empty_address_rejected() {
        let server = server_with(vec![], vec![]);

        let response = server
            .post("/analyze")
            .json(&json!({"address": "", "transactions": []}))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_analyze_exhaustion_maps_to_bad_gateway() {
        let server = server_with(
            vec![ScriptedReply::NetworkError],
            vec![ScriptedReply::NetworkError],
        );

        let response = server
            .post("/analyze")
            .json(&json!({
                "address": "0xabc",
                "transactions": []
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("attempts"));
    }
}
