use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use shared::protocol::{PopularEvent, TypeCount};
use tokio::net::TcpListener;

use crate::service::HttpEventService;

#[derive(Clone, Default)]
struct DashboardState {
    deleted_events: Arc<AtomicUsize>,
    deleted_users: Arc<AtomicUsize>,
}

async fn stats() -> Json<Value> {
    Json(json!({
        "total_users": 3,
        "total_events": 2,
        "total_enrollments": 4,
        "upcoming_events": 1,
        "events_by_type": [{"event_type": "hiking", "count": 2}],
        "popular_events": [{"id": 1, "title": "Ridge Hike", "enrollment_count": 3}]
    }))
}

async fn users() -> Json<Value> {
    Json(json!([
        {"id": 1, "name": "Alex", "email": "alex@example.com", "created_at": "2024-05-01 10:00:00"},
        {"id": 2, "name": "Sam", "email": "sam@example.com"}
    ]))
}

async fn user(Path(user_id): Path<i64>) -> (StatusCode, Json<Value>) {
    if user_id == 2 {
        return (
            StatusCode::OK,
            Json(json!({"id": 2, "name": "Sam", "email": "sam@example.com"})),
        );
    }
    (StatusCode::NOT_FOUND, Json(json!({"error": "User not found"})))
}

async fn user_enrollments(Path(_user_id): Path<i64>) -> Json<Value> {
    Json(json!([{"id": 1, "title": "Ridge Hike", "event_date": "2024-06-01"}]))
}

async fn event(Path(event_id): Path<i64>) -> Json<Value> {
    Json(json!({
        "id": event_id,
        "title": "Ridge Hike",
        "description": "",
        "location": "Cedar Point",
        "event_type": "hiking",
        "event_date": "2024-06-01",
        "event_time": "09:00",
        "max_participants": 4,
        "enrolled_count": 2
    }))
}

async fn event_enrollments(Path(_event_id): Path<i64>) -> Json<Value> {
    Json(json!([
        {"id": 1, "name": "Alex", "email": "alex@example.com"},
        {"id": 2, "name": "Sam", "email": "sam@example.com"}
    ]))
}

async fn delete_event(
    State(state): State<DashboardState>,
    Path(_event_id): Path<i64>,
) -> Json<Value> {
    state.deleted_events.fetch_add(1, Ordering::SeqCst);
    Json(json!({"message": "Event deleted successfully"}))
}

async fn delete_user(
    State(state): State<DashboardState>,
    Path(_user_id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    state.deleted_users.fetch_add(1, Ordering::SeqCst);
    (StatusCode::NOT_FOUND, Json(json!({"error": "User not found"})))
}

async fn spawn_dashboard() -> (AdminConsole, DashboardState) {
    let state = DashboardState::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/api/admin/stats", get(stats))
        .route("/api/users", get(users))
        .route("/api/user/:id", get(user))
        .route("/api/user/:id/enrollments", get(user_enrollments))
        .route("/api/event/:id", get(event))
        .route("/api/event/:id/enrollments", get(event_enrollments))
        .route("/api/event/delete/:id", delete(delete_event))
        .route("/api/user/delete/:id", delete(delete_user))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let service = HttpEventService::new(&format!("http://{addr}")).expect("service");
    (AdminConsole::new(Arc::new(service)), state)
}

#[tokio::test]
async fn fetches_stats_and_users() {
    let (console, _) = spawn_dashboard().await;

    let stats = console.stats().await.expect("stats");
    assert_eq!(stats.total_enrollments, 4);
    assert_eq!(stats.popular_events[0].title, "Ridge Hike");

    let users = console.users().await.expect("users");
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].created_at, None);
}

#[tokio::test]
async fn event_details_lists_participants() {
    let (console, _) = spawn_dashboard().await;
    let details = console.event_details(EventId(1)).await.expect("details");

    assert_eq!(
        format_event_details(&details),
        "Event: Ridge Hike\nEnrolled: 2 people\n\nParticipants:\nAlex\nSam"
    );
}

#[tokio::test]
async fn user_lookup_reports_missing_user() {
    let (console, _) = spawn_dashboard().await;

    let summary = console.user_enrollments(UserId(2)).await.expect("summary");
    assert_eq!(
        format_user_enrollments(&summary),
        "Sam's Enrollments:\n\nRidge Hike - 2024-06-01"
    );

    let err = console
        .user_enrollments(UserId(9))
        .await
        .expect_err("missing user");
    assert_eq!(err.server_message(), Some("User not found"));
}

#[tokio::test]
async fn delete_waits_for_confirmation() {
    let (mut console, state) = spawn_dashboard().await;

    let prompt = console.request_delete(DeleteTarget::Event(EventId(1)), "Ridge Hike");
    assert_eq!(
        prompt.message,
        "Are you sure you want to delete event \"Ridge Hike\"? This action cannot be undone."
    );
    assert_eq!(state.deleted_events.load(Ordering::SeqCst), 0);

    let deleted = console.confirm_delete().await.expect("delete");
    assert_eq!(deleted, DeleteTarget::Event(EventId(1)));
    assert_eq!(state.deleted_events.load(Ordering::SeqCst), 1);
    assert_eq!(console.pending_delete(), None);
}

#[tokio::test]
async fn failed_delete_still_clears_pending_target() {
    let (mut console, state) = spawn_dashboard().await;

    console.request_delete(DeleteTarget::User(UserId(5)), "Ghost");
    let err = console.confirm_delete().await.expect_err("missing user");
    assert_eq!(err.server_message(), Some("User not found"));
    assert_eq!(console.pending_delete(), None);

    assert!(matches!(
        console.confirm_delete().await,
        Err(ClientError::NoPendingAction)
    ));
    assert_eq!(state.deleted_users.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancelled_delete_sends_nothing() {
    let (mut console, state) = spawn_dashboard().await;

    console.request_delete(DeleteTarget::Event(EventId(1)), "Ridge Hike");
    console.cancel_delete();

    assert!(console.confirm_delete().await.is_err());
    assert_eq!(state.deleted_events.load(Ordering::SeqCst), 0);
}

#[test]
fn stats_text_ranks_popular_events() {
    let stats = AdminStats {
        total_users: 3,
        total_events: 2,
        total_enrollments: 5,
        upcoming_events: 2,
        events_by_type: vec![TypeCount {
            event_type: "camping".into(),
            count: 2,
        }],
        popular_events: vec![
            PopularEvent {
                id: Some(EventId(4)),
                title: "Lakeside Camp".into(),
                enrollment_count: 4,
            },
            PopularEvent {
                id: None,
                title: "Night Hike".into(),
                enrollment_count: 1,
            },
        ],
    };
    let text = format_stats(&stats);
    assert!(text.contains("  #1 Lakeside Camp (4 enrolled)"));
    assert!(text.contains("  #2 Night Hike (1 enrolled)"));
    assert!(text.contains("camping"));
}

#[test]
fn empty_stats_use_placeholders() {
    let stats = AdminStats {
        total_users: 0,
        total_events: 0,
        total_enrollments: 0,
        upcoming_events: 0,
        events_by_type: Vec::new(),
        popular_events: Vec::new(),
    };
    let text = format_stats(&stats);
    assert!(text.contains("No events yet"));
    assert!(text.contains("No enrollments yet"));
}

#[test]
fn user_without_enrollments_gets_sentence() {
    let summary = UserEnrollments {
        user: UserRecord {
            id: UserId(3),
            name: "Robin".into(),
            email: "robin@example.com".into(),
            created_at: None,
        },
        enrollments: Vec::new(),
    };
    assert_eq!(
        format_user_enrollments(&summary),
        "Robin has not enrolled in any events yet."
    );
}
