use axum::http::StatusCode;
use scholar_rewards::api::{self, AppState};
use scholar_rewards::config::{Config, StoreBackend};
use scholar_rewards::datasource::{CachedDataSource, MockDataSource};
use scholar_rewards::domain::{
    Finish, PriceQuotes, RewardCategory, RewardEntry, SeasonWindow, TimeMs, TokenAmount,
    TokenSymbol, TournamentResult,
};
use scholar_rewards::engine::brawl::parse_brawl_record;
use scholar_rewards::{Decimal, Username};
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

const JAN_1: i64 = 1_704_067_200_000;
const FEB_1: i64 = 1_706_745_600_000;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn config(default_usernames: Vec<Username>) -> Config {
    Config {
        port: 0,
        splinterlands_api_url: "http://example.invalid".to_string(),
        prices_api_url: "http://example.invalid".to_string(),
        store: StoreBackend::None,
        cache_ttl_secs: 300,
        default_scholar_pct: d("50"),
        default_usernames,
        guild_id: "guild-1".to_string(),
    }
}

fn reward(token: &str, amount: &str, category: RewardCategory) -> RewardEntry {
    RewardEntry::new(TokenSymbol::new(token), d(amount), category, TimeMs::new(JAN_1 + 1))
}

fn base_mock() -> MockDataSource {
    MockDataSource::new()
        .with_season(SeasonWindow::new(205, TimeMs::new(JAN_1), TimeMs::new(FEB_1)))
        .with_prices(PriceQuotes::new().with("sps", d("0.05")).with("dec", d("0.001")))
}

fn setup_app(mock: MockDataSource, default_usernames: Vec<Username>) -> axum::Router {
    let datasource = Arc::new(CachedDataSource::new(Arc::new(mock), Duration::from_secs(300)));
    let state = AppState::new(datasource, None, config(default_usernames));
    api::create_router(state)
}

async fn send(app: &axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_and_ready_without_store() {
    let app = setup_app(base_mock(), vec![]);

    let (status, body) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "none");
}

#[tokio::test]
async fn test_summary_isolates_failing_user() {
    let mock = base_mock()
        .with_rewards(
            "alice",
            vec![
                reward("SPS", "100", RewardCategory::Ranked),
                reward("DEC", "1000", RewardCategory::Brawl),
            ],
        )
        .with_failing_user("bob");
    let app = setup_app(mock, vec![]);

    let (status, body) = send(&app, "GET", "/v1/summary?users=alice,bob&scholarPct=40").await;
    assert_eq!(status, StatusCode::OK);

    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "alice");
    assert_eq!(users[0]["totals"]["overall"]["usd"].as_f64(), Some(6.0));
    assert_eq!(users[0]["scholarShareUsd"].as_f64(), Some(2.4));
    assert_eq!(body["scholarPct"].as_f64(), Some(40.0));

    let warnings = body["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("bob"));
    assert!(body["message"].is_null());
}

#[tokio::test]
async fn test_summary_uses_default_usernames() {
    let cup = TournamentResult {
        id: "cup-1".to_string(),
        name: "Cup".to_string(),
        start_date: Some(TimeMs::new(JAN_1 + 10)),
        finish: Finish::Placed(1),
        entry_fee: Some(TokenAmount::new(TokenSymbol::new("SPS"), d("10"))),
        rewards: vec![TokenAmount::new(TokenSymbol::new("SPS"), d("40"))],
        raw: json!({"id": "cup-1"}),
    };
    let mock = base_mock()
        .with_rewards("alice", vec![reward("SPS", "20", RewardCategory::Ranked)])
        .with_tournaments("alice", vec![cup]);
    let app = setup_app(mock, vec![Username::new("alice")]);

    let (status, body) = send(&app, "GET", "/v1/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"][0]["username"], "alice");
    assert_eq!(body["users"][0]["totals"]["tournament"]["usd"].as_f64(), Some(2.0));
    assert_eq!(body["users"][0]["totals"]["entry_fees"]["usd"].as_f64(), Some(0.5));
    assert_eq!(body["scholarPct"].as_f64(), Some(50.0));
}

#[tokio::test]
async fn test_summary_without_data_reports_message() {
    let app = setup_app(base_mock(), vec![]);

    let (status, body) = send(&app, "GET", "/v1/summary?users=nobody").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No data found yet. Try adding usernames.");
    assert!(body["combined"].is_null());
}

#[tokio::test]
async fn test_summary_rejects_out_of_range_pct() {
    let app = setup_app(base_mock(), vec![]);

    let (status, body) = send(&app, "GET", "/v1/summary?users=alice&scholarPct=150").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("scholarPct"));

    let (status, _) = send(&app, "GET", "/v1/summary?users=alice&scholarPct=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summary_fails_when_season_unavailable() {
    let mock = MockDataSource::new().with_prices(PriceQuotes::new());
    let app = setup_app(mock, vec![]);

    let (status, body) = send(&app, "GET", "/v1/summary?users=alice").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_refresh_clears_cached_responses() {
    let mock = base_mock().with_rewards("alice", vec![reward("SPS", "100", RewardCategory::Ranked)]);
    let app = setup_app(mock.clone(), vec![]);

    send(&app, "GET", "/v1/summary?users=alice").await;
    let after_first = mock.call_count();
    assert!(after_first > 0);

    send(&app, "GET", "/v1/summary?users=alice").await;
    assert_eq!(mock.call_count(), after_first);

    let (status, body) = send(&app, "POST", "/v1/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "refreshed");

    send(&app, "GET", "/v1/summary?users=alice").await;
    assert_eq!(mock.call_count(), after_first * 2);
}

#[tokio::test]
async fn test_brawls_endpoint_reports_player_stats() {
    let brawls = (1..=2)
        .map(|c| parse_brawl_record(&json!({"cycle": c, "tournament_id": format!("b-{}", c)})).unwrap())
        .collect();
    let mock = base_mock()
        .with_brawls(brawls)
        .with_brawl_details("b-2", json!({"players": [{"player": "alice", "wins": 3, "losses": 1}]}));
    let app = setup_app(mock, vec![]);

    let (status, body) = send(&app, "GET", "/v1/brawls?window=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["guildId"], "guild-1");
    assert_eq!(body["brawlsLoaded"], 1);
    assert_eq!(body["brawlsSkipped"], 1);
    assert_eq!(body["players"][0]["player"], "alice");
    assert_eq!(body["players"][0]["wins"], 3);

    let (status, _) = send(&app, "GET", "/v1/brawls?window=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_endpoints_unavailable_without_store() {
    let app = setup_app(base_mock(), vec![]);

    let (status, body) = send(&app, "GET", "/v1/history?user=alice").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("store"));
}
