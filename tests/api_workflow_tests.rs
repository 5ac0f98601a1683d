use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt; // for `oneshot`

mod utils;

use utils::*;

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = TestAppBuilder::new().with_four_players().build().await;

    let response = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/sections")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_unknown_user_is_rejected() {
    let app = TestAppBuilder::new().with_four_players().build().await;

    let response = app.get("/sections", &app.stranger_token()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_full_section_scenario() {
    let app = TestAppBuilder::new().with_four_players().build().await;
    let section_id = app.create_section("friday night", 50).await;

    // Game 1: sums to 100,000 at 25,000 starting points
    let response = app
        .record_game(&section_id, &app.player("alice").token, &[45000, 32000, 15000, 8000])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let game = json_body(response).await;
    assert_eq!(game["game_number"], 1);
    assert_eq!(game["scores"].as_array().unwrap().len(), 4);

    // Summary after one game: ranks 1..4, alice +15,000 / +750
    let response = app
        .get(&format!("/sections/{}/summary", section_id), &app.admin.token)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = json_body(response).await;
    assert_eq!(summary["game_count"], 1);
    assert_eq!(summary["money_enabled"], true);

    let alice_row = summary_row(&summary, &app.player("alice").id);
    assert_eq!(alice_row["total_points"], 45000);
    assert_eq!(alice_row["point_diff"], 15000);
    assert_eq!(alice_row["settlement"], 750.0);
    assert_eq!(alice_row["rank"], 1);

    let daiki_row = summary_row(&summary, &app.player("daiki").id);
    assert_eq!(daiki_row["rank"], 4);
    assert_eq!(daiki_row["settlement"], -1100.0);

    // Close, then the stats pick the section up
    let response = app
        .close_section(&section_id, &app.player("alice").token)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let closed = json_body(response).await;
    assert_eq!(closed["status"], "closed");

    let response = app.get("/stats", &app.admin.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = json_body(response).await;
    assert_eq!(stats["total_games"], 1);
    assert_eq!(stats["total_sections"], 1);

    let alice_stats = stats_row(&stats, &app.player("alice").id).unwrap();
    assert_eq!(alice_stats["game_count"], 1);
    assert_eq!(alice_stats["win_count"], 1);
    assert_eq!(alice_stats["win_rate"], 100.0);
    assert_eq!(alice_stats["average_rank"], 1.0);
    assert_eq!(alice_stats["total_settlement"], 750.0);
    assert_eq!(alice_stats["rank_counts"]["first"], 1);

    // Settlement order: alice first, daiki last
    let users = stats["users"].as_array().unwrap();
    assert_eq!(users[0]["user_id"], app.player("alice").id.as_str());
    assert_eq!(users[3]["user_id"], app.player("daiki").id.as_str());
}

#[tokio::test]
async fn test_unbalanced_scores_are_rejected_with_diff() {
    let app = TestAppBuilder::new().with_four_players().build().await;
    let section_id = app.create_section("friday night", 50).await;

    let response = app
        .record_game(&section_id, &app.player("alice").token, &[45000, 32000, 15000, 7000])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let message = error_message(response).await;
    assert!(message.contains("100000"), "message was: {}", message);
    assert!(message.contains("99000"), "message was: {}", message);
}

#[tokio::test]
async fn test_unquantized_scores_are_rejected() {
    let app = TestAppBuilder::new().with_four_players().build().await;
    let section_id = app.create_section("friday night", 50).await;

    let response = app
        .record_game(&section_id, &app.player("alice").token, &[24950, 25050, 25000, 25000])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let message = error_message(response).await;
    assert!(message.contains("100"), "message was: {}", message);
}

#[tokio::test]
async fn test_tied_scores_share_rank_in_summary() {
    let app = TestAppBuilder::new().with_four_players().build().await;
    let section_id = app.create_section("friday night", 50).await;

    let response = app
        .record_game(&section_id, &app.player("alice").token, &[45000, 32000, 32000, -9000])
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let summary = json_body(
        app.get(&format!("/sections/{}/summary", section_id), &app.admin.token)
            .await,
    )
    .await;

    let ranks: Vec<i64> = summary["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["rank"].as_i64().unwrap())
        .collect();
    assert_eq!(ranks, vec![1, 2, 2, 4]);
}

#[tokio::test]
async fn test_summary_rows_follow_roster_order() {
    let app = TestAppBuilder::new().with_four_players().build().await;
    let section_id = app.create_section("friday night", 50).await;

    // daiki wins; the roster order must still be alice..daiki
    app.record_game(&section_id, &app.player("alice").token, &[8000, 15000, 32000, 45000])
        .await;

    let summary = json_body(
        app.get(&format!("/sections/{}/summary", section_id), &app.admin.token)
            .await,
    )
    .await;

    let ids: Vec<&str> = summary["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["user_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, app.participant_ids());
}

#[tokio::test]
async fn test_rate_zero_section_suppresses_money() {
    let app = TestAppBuilder::new().with_four_players().build().await;
    let section_id = app.create_section("no stakes", 0).await;

    app.record_game(&section_id, &app.player("alice").token, &[45000, 32000, 15000, 8000])
        .await;

    let summary = json_body(
        app.get(&format!("/sections/{}/summary", section_id), &app.admin.token)
            .await,
    )
    .await;

    assert_eq!(summary["money_enabled"], false);
    for row in summary["rows"].as_array().unwrap() {
        assert_eq!(row["settlement"], 0.0);
    }
}

#[tokio::test]
async fn test_closed_section_rejects_score_mutations_for_everyone() {
    let app = TestAppBuilder::new().with_four_players().build().await;
    let section_id = app.create_section("friday night", 50).await;

    let game = json_body(
        app.record_game(&section_id, &app.player("alice").token, &[45000, 32000, 15000, 8000])
            .await,
    )
    .await;
    let game_id = game["id"].as_str().unwrap();

    app.close_section(&section_id, &app.player("alice").token)
        .await;

    // New game: conflict even for the admin
    let response = app
        .record_game(&section_id, &app.admin.token, &[45000, 32000, 15000, 8000])
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Score correction: conflict
    let scores: Vec<serde_json::Value> = app
        .players
        .iter()
        .map(|p| json!({"user_id": p.id, "points": 25000}))
        .collect();
    let response = app
        .put_json(
            &format!("/sections/{}/games/{}", section_id, game_id),
            &app.admin.token,
            json!({ "scores": scores }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Game deletion: conflict
    let response = app
        .delete(
            &format!("/sections/{}/games/{}", section_id, game_id),
            &app.admin.token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reopen_allows_corrections_again() {
    let app = TestAppBuilder::new().with_four_players().build().await;
    let section_id = app.create_section("friday night", 50).await;

    let game = json_body(
        app.record_game(&section_id, &app.player("alice").token, &[45000, 32000, 15000, 8000])
            .await,
    )
    .await;
    let game_id = game["id"].as_str().unwrap();

    app.close_section(&section_id, &app.player("alice").token)
        .await;
    let response = app
        .post_json(
            &format!("/sections/{}/reopen", section_id),
            &app.player("alice").token,
            json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let reopened = json_body(response).await;
    assert_eq!(reopened["status"], "active");
    assert!(reopened["closed_at"].is_null());

    let scores: Vec<serde_json::Value> = app
        .players
        .iter()
        .zip([40000, 37000, 15000, 8000])
        .map(|(p, points)| json!({"user_id": p.id, "points": points}))
        .collect();
    let response = app
        .put_json(
            &format!("/sections/{}/games/{}", section_id, game_id),
            &app.player("bob").token,
            json!({ "scores": scores }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = json_body(response).await;
    assert_eq!(updated["scores"][0]["points"], 40000);
}

#[tokio::test]
async fn test_permission_checks_across_roles() {
    let app = TestAppBuilder::new().with_four_players().build().await;
    let section_id = app.create_section("friday night", 50).await;

    // Non-admin cannot manage the roster
    let response = app
        .post_json(
            "/users",
            &app.player("alice").token,
            json!({"display_name": "newcomer"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // bob participates but is not the creator: cannot close
    let response = app
        .close_section(&section_id, &app.player("bob").token)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // but the admin can
    let response = app.close_section(&section_id, &app.admin.token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stats_count_empty_sections_but_not_idle_users() {
    let app = TestAppBuilder::new().with_four_players().build().await;

    // One played section, one closed without any games
    let played = app.create_section("played", 50).await;
    app.record_game(&played, &app.player("alice").token, &[45000, 32000, 15000, 8000])
        .await;
    app.close_section(&played, &app.player("alice").token).await;

    let empty = app.create_section("empty", 50).await;
    app.close_section(&empty, &app.player("alice").token).await;

    let stats = json_body(app.get("/stats", &app.admin.token).await).await;

    assert_eq!(stats["total_sections"], 2);
    assert_eq!(stats["total_games"], 1);

    // Every listed user actually played; membership alone is not enough
    for user in stats["users"].as_array().unwrap() {
        assert!(user["game_count"].as_u64().unwrap() > 0);
    }
    // But membership in the empty section still counts toward sections
    let alice_stats = stats_row(&stats, &app.player("alice").id).unwrap();
    assert_eq!(alice_stats["section_count"], 2);
}

#[tokio::test]
async fn test_stats_date_filter_excludes_out_of_range_sections() {
    let app = TestAppBuilder::new().with_four_players().build().await;

    let section_id = app.create_section("tonight", 50).await;
    app.record_game(&section_id, &app.player("alice").token, &[45000, 32000, 15000, 8000])
        .await;
    app.close_section(&section_id, &app.player("alice").token)
        .await;

    // A window far in the past sees nothing
    let stats = json_body(
        app.get("/stats?from=2000-01-01&to=2000-12-31", &app.admin.token)
            .await,
    )
    .await;
    assert_eq!(stats["total_sections"], 0);
    assert!(stats["users"].as_array().unwrap().is_empty());

    // An open-ended window starting long ago sees the section
    let stats = json_body(app.get("/stats?from=2000-01-01", &app.admin.token).await).await;
    assert_eq!(stats["total_sections"], 1);
}

#[tokio::test]
async fn test_three_player_section_end_to_end() {
    let app = TestAppBuilder::new().with_three_players().build().await;

    let response = app
        .post_json(
            "/sections",
            &app.players[0].token,
            json!({
                "name": "sanma",
                "starting_points": 35000,
                "return_points": 40000,
                "rate": 30,
                "player_count": 3,
                "participant_ids": app.participant_ids(),
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let section = json_body(response).await;
    let section_id = section["id"].as_str().unwrap();

    // 3 x 35,000 = 105,000
    let response = app
        .record_game(section_id, &app.player("alice").token, &[50000, 30000, 25000])
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    app.close_section(section_id, &app.player("alice").token)
        .await;

    let stats = json_body(app.get("/stats", &app.admin.token).await).await;
    let chiyo_stats = stats_row(&stats, &app.player("chiyo").id).unwrap();
    assert_eq!(chiyo_stats["rank_counts"]["third"], 1);
    assert_eq!(chiyo_stats["rank_counts"]["fourth"], 0);
}

#[tokio::test]
async fn test_soft_deleted_user_loses_access_but_keeps_history() {
    let app = TestAppBuilder::new().with_four_players().build().await;
    let section_id = app.create_section("friday night", 50).await;

    app.record_game(&section_id, &app.player("alice").token, &[45000, 32000, 15000, 8000])
        .await;
    app.close_section(&section_id, &app.player("alice").token)
        .await;

    // Admin removes daiki from the roster
    let response = app
        .delete(
            &format!("/users/{}", app.player("daiki").id),
            &app.admin.token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // daiki's token no longer authenticates
    let response = app.get("/sections", &app.player("daiki").token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // but the recorded history still names them
    let stats = json_body(app.get("/stats", &app.admin.token).await).await;
    let daiki_stats = stats_row(&stats, &app.player("daiki").id).unwrap();
    assert_eq!(daiki_stats["display_name"], "daiki");
    assert_eq!(daiki_stats["game_count"], 1);
}

#[tokio::test]
async fn test_section_list_filters() {
    let app = TestAppBuilder::new().with_four_players().build().await;

    let open_id = app.create_section("friday night", 50).await;
    let closed_id = app.create_section("last week", 50).await;
    app.close_section(&closed_id, &app.player("alice").token)
        .await;

    let listed = json_body(app.get("/sections?status=active", &app.admin.token).await).await;
    let ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![open_id.as_str()]);

    let searched = json_body(app.get("/sections?search=WEEK", &app.admin.token).await).await;
    let ids: Vec<&str> = searched
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![closed_id.as_str()]);

    let bad = app.get("/sections?status=archived", &app.admin.token).await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}
