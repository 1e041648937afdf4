//! Integration tests for the rally-point matchmaking service
//!
//! These tests validate the system working together:
//! - On-demand matching with wait-time based window expansion
//! - Batch sweeps over whole partitions
//! - Persist-before-remove commit ordering
//! - The HTTP API surface and its error translation

mod fixtures;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use rally_point::api::{ApiServer, ApiServerConfig};
use rally_point::config::AppConfig;
use rally_point::error::MatchmakingError;
use rally_point::matcher::{BatchMatcher, OnDemandMatcher};
use rally_point::service::AppState;
use rally_point::types::{GameMode, Player, QueueRequest, Region};
use rally_point::QueueStore;
use std::sync::Arc;
use tower::ServiceExt;

use fixtures::{enqueue_all, player_with_wait, test_metrics, test_settings, test_store};

#[tokio::test]
async fn test_two_duel_players_in_same_slice_match() {
    let store = test_store();
    let first = Player::new(1500, Region::Eu, GameMode::OneVsOne, 5);
    let second = Player::new(1550, Region::Eu, GameMode::OneVsOne, 7);
    enqueue_all(&store, &[first.clone(), second.clone()]).await;

    let matcher = OnDemandMatcher::new(store.clone(), test_settings(), test_metrics());
    let matched = matcher.find_match(first.id).await.unwrap();

    assert_eq!(matched.players.len(), 2);
    let ids: Vec<_> = matched.players.iter().map(|p| p.id).collect();
    assert!(ids.contains(&first.id));
    assert!(ids.contains(&second.id));
    for player in &matched.players {
        assert_eq!(player.region, Region::Eu);
        assert_eq!(player.mode, GameMode::OneVsOne);
    }
}

#[tokio::test]
async fn test_window_expands_after_two_slices() {
    // 61 seconds of waiting is two full slices: 200 + 2*50 = 300
    let store = test_store();
    let anchor = player_with_wait(1500, Region::Eu, GameMode::ThreeVsThree, 61);
    let mut players = vec![anchor.clone()];
    for rating in [1510, 1520, 1530, 1540] {
        players.push(Player::new(rating, Region::Eu, GameMode::ThreeVsThree, 1));
    }
    // The sixth candidate sits 290 above the anchor, inside the widened window
    let edge = Player::new(1500 + 290, Region::Eu, GameMode::ThreeVsThree, 1);
    players.push(edge.clone());
    enqueue_all(&store, &players).await;

    let matcher = OnDemandMatcher::new(store.clone(), test_settings(), test_metrics());
    let matched = matcher.find_match(anchor.id).await.unwrap();

    assert_eq!(matched.players.len(), 6);
    assert!(matched.players.iter().any(|p| p.id == edge.id));
}

#[tokio::test]
async fn test_candidate_past_expanded_window_rejected() {
    let store = test_store();
    let anchor = player_with_wait(1500, Region::Eu, GameMode::ThreeVsThree, 61);
    let mut players = vec![anchor.clone()];
    for rating in [1510, 1520, 1530, 1540] {
        players.push(Player::new(rating, Region::Eu, GameMode::ThreeVsThree, 1));
    }
    // 310 above the anchor is outside the 300-wide window: group stays at 5
    players.push(Player::new(1500 + 310, Region::Eu, GameMode::ThreeVsThree, 1));
    enqueue_all(&store, &players).await;

    let matcher = OnDemandMatcher::new(store.clone(), test_settings(), test_metrics());
    let err = matcher.find_match(anchor.id).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MatchmakingError>(),
        Some(MatchmakingError::NoMatchFound { .. })
    ));
    // Nobody was removed from the queue
    assert_eq!(
        store
            .partition_size(Region::Eu, GameMode::ThreeVsThree)
            .await
            .unwrap(),
        6
    );
}

#[tokio::test]
async fn test_find_match_is_idempotent_across_members() {
    let store = test_store();
    let a = Player::new(1500, Region::Us, GameMode::OneVsOne, 1);
    let b = Player::new(1490, Region::Us, GameMode::OneVsOne, 1);
    enqueue_all(&store, &[a.clone(), b.clone()]).await;

    let matcher = OnDemandMatcher::new(store.clone(), test_settings(), test_metrics());
    let first = matcher.find_match(a.id).await.unwrap();
    let again = matcher.find_match(a.id).await.unwrap();
    let by_partner = matcher.find_match(b.id).await.unwrap();

    assert_eq!(first.id, again.id);
    assert_eq!(first.id, by_partner.id);
    assert_eq!(first.players.len(), 2);
}

#[tokio::test]
async fn test_persisted_match_survives_stale_dequeue() {
    let store = test_store();
    let a = Player::new(1500, Region::Eu, GameMode::OneVsOne, 1);
    let b = Player::new(1505, Region::Eu, GameMode::OneVsOne, 1);
    enqueue_all(&store, &[a.clone(), b.clone()]).await;

    let matcher = OnDemandMatcher::new(store.clone(), test_settings(), test_metrics());
    let matched = matcher.find_match(a.id).await.unwrap();

    // Members are already dequeued; removing one again reports it missing
    let err = store.dequeue(b.id).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MatchmakingError>(),
        Some(MatchmakingError::PlayerNotFound { .. })
    ));

    // The persisted match is untouched
    let requeried = store.match_for_player(b.id).await.unwrap().unwrap();
    assert_eq!(requeried.id, matched.id);
}

#[tokio::test]
async fn test_batch_sweep_drains_partition_in_groups_of_six() {
    let store = test_store();
    let players: Vec<Player> = (0..7)
        .map(|i| Player::new(1500 + i * 10, Region::Asia, GameMode::ThreeVsThree, 1))
        .collect();
    enqueue_all(&store, &players).await;

    let matcher = BatchMatcher::new(store.clone(), test_settings(), test_metrics());
    let matches = matcher
        .process_queue(Region::Asia, GameMode::ThreeVsThree)
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].players.len(), 6);
    assert_eq!(
        store
            .partition_size(Region::Asia, GameMode::ThreeVsThree)
            .await
            .unwrap(),
        1
    );

    // Six more compatible arrivals fill a second group
    let late: Vec<Player> = (0..6)
        .map(|i| Player::new(1495 + i * 10, Region::Asia, GameMode::ThreeVsThree, 1))
        .collect();
    enqueue_all(&store, &late).await;

    let second = matcher
        .process_queue(Region::Asia, GameMode::ThreeVsThree)
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].players.len(), 6);
}

#[tokio::test]
async fn test_batch_and_on_demand_agree_on_persisted_matches() {
    let store = test_store();
    let players: Vec<Player> = (0..2)
        .map(|i| Player::new(1500 + i * 5, Region::Eu, GameMode::OneVsOne, 1))
        .collect();
    enqueue_all(&store, &players).await;

    let batch = BatchMatcher::new(store.clone(), test_settings(), test_metrics());
    let matches = batch
        .process_queue(Region::Eu, GameMode::OneVsOne)
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);

    // The on-demand path re-queries the batch-made match instead of failing
    let on_demand = OnDemandMatcher::new(store.clone(), test_settings(), test_metrics());
    let requeried = on_demand.find_match(players[0].id).await.unwrap();
    assert_eq!(requeried.id, matches[0].id);
}

#[tokio::test]
async fn test_http_flow_join_match_and_requery() {
    let state = Arc::new(AppState::new(AppConfig::default()).await.unwrap());
    let app = ApiServer::new(ApiServerConfig::default(), state.clone()).create_router();

    // Two players join EU 1v1 over HTTP
    let mut ids = Vec::new();
    for rating in [1500, 1550] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/queue/join")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"rating": {}, "region": "EU", "game_mode": "1v1"}}"#,
                        rating
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        ids.push(body["player_id"].as_str().unwrap().to_string());
    }

    // First player finds a match containing both
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/queue/match/{}", ids[0]))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let matched: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(matched["players"].as_array().unwrap().len(), 2);

    // The partner re-queries the same match
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/queue/match/{}", ids[1]))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let requeried: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(requeried["id"], matched["id"]);
}

#[tokio::test]
async fn test_queue_request_with_unknown_mode_defaults_to_six() {
    let state = Arc::new(AppState::new(AppConfig::default()).await.unwrap());

    let player = state
        .join_queue(QueueRequest {
            rating: 1500,
            region: Region::Eu,
            mode: GameMode::Unknown,
            player_level: 1,
        })
        .await
        .unwrap();
    assert_eq!(player.mode.players_per_match(), 6);

    // One player cannot fill a six-person group
    let err = state.find_match(player.id).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MatchmakingError>(),
        Some(MatchmakingError::NoMatchFound { .. })
    ));
}
