use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{EventId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(alias = "user_id")]
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollRequest {
    pub event_id: EventId,
    pub user_id: UserId,
}

/// Generic success acknowledgement; the service may add arbitrary fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /api/event/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub location: String,
    pub event_date: NaiveDate,
    pub event_time: String,
    pub max_participants: Option<u32>,
    pub created_by: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeCount {
    pub event_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub title: String,
    pub enrollment_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_events: u64,
    pub total_enrollments: u64,
    pub upcoming_events: u64,
    #[serde(default)]
    pub events_by_type: Vec<TypeCount>,
    #[serde(default)]
    pub popular_events: Vec<PopularEvent>,
}
