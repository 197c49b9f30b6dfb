use axum::Json;

/// GET / — liveness probe with service identity.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "pagewright deployment API",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
