use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::assertions::json_body;
use super::setup::TestApp;

impl TestApp {
    /// Sends one request through the full router with a bearer token
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", token));

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: &str) -> Response {
        self.send("GET", uri, token, None).await
    }

    pub async fn post_json(&self, uri: &str, token: &str, body: Value) -> Response {
        self.send("POST", uri, token, Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, token: &str, body: Value) -> Response {
        self.send("PUT", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Response {
        self.send("DELETE", uri, token, None).await
    }

    /// Creates a section over the API with the seeded players as its
    /// roster and returns its id. The first seeded player is the creator.
    pub async fn create_section(&self, name: &str, rate: i32) -> String {
        let response = self
            .post_json(
                "/sections",
                &self.players[0].token,
                json!({
                    "name": name,
                    "starting_points": 25000,
                    "return_points": 30000,
                    "rate": rate,
                    "player_count": self.players.len(),
                    "participant_ids": self.participant_ids(),
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        body["id"].as_str().unwrap().to_string()
    }

    /// Records a game with the given points in seeded-player order and
    /// returns the response
    pub async fn record_game(&self, section_id: &str, token: &str, points: &[i32]) -> Response {
        let scores: Vec<Value> = self
            .players
            .iter()
            .zip(points)
            .map(|(player, points)| json!({"user_id": player.id, "points": points}))
            .collect();

        self.post_json(
            &format!("/sections/{}/games", section_id),
            token,
            json!({ "scores": scores }),
        )
        .await
    }

    pub async fn close_section(&self, section_id: &str, token: &str) -> Response {
        self.post_json(&format!("/sections/{}/close", section_id), token, json!({}))
            .await
    }
}
