use axum::response::Response;
use serde_json::Value;

/// Reads a response body as JSON
pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("invalid JSON body: {}", e))
}

/// Reads the error message out of an error response body
pub async fn error_message(response: Response) -> String {
    let body = json_body(response).await;
    body["error"]
        .as_str()
        .unwrap_or_else(|| panic!("no error field in {}", body))
        .to_string()
}

/// Finds the summary row for one user id
pub fn summary_row<'a>(summary: &'a Value, user_id: &str) -> &'a Value {
    summary["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["user_id"] == user_id)
        .unwrap_or_else(|| panic!("no summary row for {}", user_id))
}

/// Finds the stats row for one user id
pub fn stats_row<'a>(stats: &'a Value, user_id: &str) -> Option<&'a Value> {
    stats["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["user_id"] == user_id)
}
