mod support;

use axum::body::Body;
use axum::http::{Request, StatusCode, header::CACHE_CONTROL};
use time::macros::datetime;

use support::{app_at, get, send};

#[tokio::test]
async fn progress_inside_window() {
    let app = app_at(datetime!(2025-11-01 15:00 UTC));
    let reply = get(&app.router, "/api/progress").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.headers.get(CACHE_CONTROL).unwrap(),
        "public, s-maxage=3600, stale-while-revalidate=86400"
    );
    let body = reply.body;
    assert_eq!(body["current_date"], "01/11/2025");
    assert_eq!(body["start_date"], "10/08/2025");
    assert_eq!(body["end_date"], "31/12/2025");
    assert_eq!(body["total_days"], 143);
    assert_eq!(body["days_elapsed"], 83);
    assert_eq!(body["days_remaining"], 60);
    assert_eq!(body["progress_percentage"], 58.5);
    assert_eq!(body["is_completed"], false);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn progress_on_first_day_is_the_floor() {
    let app = app_at(datetime!(2025-08-10 12:00 UTC));
    let body = get(&app.router, "/api/progress").await.body;

    assert_eq!(body["days_elapsed"], 0);
    assert_eq!(body["progress_percentage"], 1.0);
    assert_eq!(body["is_completed"], false);
}

#[tokio::test]
async fn progress_before_and_after_window() {
    let before = app_at(datetime!(2025-07-01 12:00 UTC));
    let body = get(&before.router, "/api/progress").await.body;
    assert_eq!(body["progress_percentage"], 1.0);
    assert_eq!(body["is_completed"], false);
    assert_eq!(body["days_elapsed"], 0);
    assert_eq!(body["days_remaining"], 143);

    let after = app_at(datetime!(2026-02-01 12:00 UTC));
    let body = get(&after.router, "/api/progress").await.body;
    assert_eq!(body["progress_percentage"], 100.0);
    assert_eq!(body["is_completed"], true);
    assert_eq!(body["days_remaining"], 0);
    assert_eq!(body["days_elapsed"], 143);
}

#[tokio::test]
async fn current_date_follows_goal_timezone() {
    // 02:00 UTC is still the previous evening in São Paulo.
    let app = app_at(datetime!(2025-11-01 02:00 UTC));
    let body = get(&app.router, "/api/progress").await.body;

    assert_eq!(body["current_date"], "31/10/2025");
    assert_eq!(body["days_elapsed"], 82);
}

#[tokio::test]
async fn milestones_use_their_own_dates() {
    let app = app_at(datetime!(2025-12-01 15:00 UTC));
    let reply = get(&app.router, "/api/milestones").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.headers.get(CACHE_CONTROL).unwrap(),
        "public, s-maxage=3600, stale-while-revalidate=86400"
    );
    let milestones = reply.body["milestones"].as_array().unwrap().clone();
    assert_eq!(milestones.len(), 6);
    assert_eq!(milestones[0]["date"], "2025-08-10");

    let achieved: Vec<bool> = milestones
        .iter()
        .map(|m| m["achieved"].as_bool().unwrap())
        .collect();
    assert_eq!(achieved, vec![true, true, true, true, true, false]);

    // The 85% checkpoint is reached although progress is still below 85%.
    let progress = get(&app.router, "/api/progress").await.body;
    assert!(progress["progress_percentage"].as_f64().unwrap() < 85.0);
    assert_eq!(milestones[4]["percentage"], 85);
}

#[tokio::test]
async fn stats_inside_window() {
    let app = app_at(datetime!(2025-11-01 15:00 UTC));
    let reply = get(&app.router, "/api/stats").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.headers.get(CACHE_CONTROL).unwrap(),
        "public, s-maxage=1800, stale-while-revalidate=3600"
    );
    let body = reply.body;
    assert_eq!(body["timeline"]["total_days"], 143);
    assert_eq!(body["timeline"]["days_elapsed"], 83);
    assert_eq!(body["timeline"]["days_remaining"], 60);
    assert_eq!(body["timeline"]["weeks_total"], 20.4);
    assert_eq!(body["timeline"]["weeks_elapsed"], 11.9);
    assert_eq!(body["timeline"]["months_total"], 4.7);
    assert_eq!(body["timeline"]["months_elapsed"], 2.7);
    assert_eq!(body["daily_average_required"], 48.95);
    assert_eq!(body["current_pace"], "on track");
    assert_eq!(body["meta_info"]["target_value"], 7000);
    assert_eq!(body["meta_info"]["current_estimate"], 4063);
    assert_eq!(body["meta_info"]["success_probability"], 100);
}

#[tokio::test]
async fn stats_outside_window() {
    let before = app_at(datetime!(2025-07-01 12:00 UTC));
    let body = get(&before.router, "/api/stats").await.body;
    assert_eq!(body["current_pace"], "not started");
    assert_eq!(body["meta_info"]["success_probability"], 95);
    assert_eq!(body["meta_info"]["current_estimate"], 0);

    let after = app_at(datetime!(2026-01-10 12:00 UTC));
    let body = get(&after.router, "/api/stats").await.body;
    assert_eq!(body["current_pace"], "completed");
    assert_eq!(body["meta_info"]["success_probability"], 100);
    assert_eq!(body["timeline"]["days_remaining"], 0);
}

#[tokio::test]
async fn repeated_calls_are_identical() {
    let app = app_at(datetime!(2025-10-15 15:00 UTC));
    let first = get(&app.router, "/api/progress").await.body;
    let second = get(&app.router, "/api/progress").await.body;
    assert_eq!(first, second);
}

#[tokio::test]
async fn health_without_database_is_no_content() {
    let app = app_at(datetime!(2025-10-15 15:00 UTC));
    let reply = get(&app.router, "/health").await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn request_id_is_echoed_or_minted() {
    let app = app_at(datetime!(2025-10-15 15:00 UTC));

    let request = Request::builder()
        .uri("/api/progress")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();
    let reply = send(&app.router, request).await;
    assert_eq!(reply.headers.get("x-request-id").unwrap(), "trace-42");

    let reply = get(&app.router, "/api/milestones").await;
    let minted = reply.headers.get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(minted.len(), 36);
}
