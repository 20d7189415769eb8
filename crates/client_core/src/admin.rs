//! Dashboard operations: statistics, listings, lookups and confirmed deletes.

use std::{fmt, sync::Arc};

use shared::{
    domain::{Event, EventId, Participant, UserEnrollment, UserId, UserRecord},
    protocol::AdminStats,
};
use tracing::{info, warn};

use crate::{
    error::{ClientError, ClientResult},
    service::{AdminService, EventService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    User(UserId),
    Event(EventId),
}

impl fmt::Display for DeleteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user {id}"),
            Self::Event(id) => write!(f, "event {id}"),
        }
    }
}

impl DeleteTarget {
    fn kind(self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Event(_) => "event",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub target: DeleteTarget,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct EventDetails {
    pub event: Event,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone)]
pub struct UserEnrollments {
    pub user: UserRecord,
    pub enrollments: Vec<UserEnrollment>,
}

pub struct AdminConsole {
    service: Arc<dyn AdminService>,
    pending_delete: Option<DeleteTarget>,
}

impl AdminConsole {
    pub fn new(service: Arc<dyn AdminService>) -> Self {
        Self {
            service,
            pending_delete: None,
        }
    }

    pub async fn stats(&self) -> ClientResult<AdminStats> {
        self.service.admin_stats().await
    }

    pub async fn users(&self) -> ClientResult<Vec<UserRecord>> {
        self.service.list_users().await
    }

    pub async fn events(&self) -> ClientResult<Vec<Event>> {
        self.service.list_events().await
    }

    pub async fn event_details(&self, event_id: EventId) -> ClientResult<EventDetails> {
        let participants = self.service.event_enrollments(event_id).await?;
        let event = self.service.fetch_event(event_id).await?;
        Ok(EventDetails {
            event,
            participants,
        })
    }

    pub async fn user_enrollments(&self, user_id: UserId) -> ClientResult<UserEnrollments> {
        let enrollments = self.service.user_enrollments(user_id).await?;
        let user = self.service.fetch_user(user_id).await?;
        Ok(UserEnrollments { user, enrollments })
    }

    /// Records `target` for deletion; nothing is sent until [`Self::confirm_delete`].
    pub fn request_delete(&mut self, target: DeleteTarget, name: &str) -> DeletePrompt {
        self.pending_delete = Some(target);
        DeletePrompt {
            target,
            message: format!(
                "Are you sure you want to delete {} \"{name}\"? This action cannot be undone.",
                target.kind()
            ),
        }
    }

    pub fn pending_delete(&self) -> Option<DeleteTarget> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Issues the pending delete. The pending target is cleared either way.
    pub async fn confirm_delete(&mut self) -> ClientResult<DeleteTarget> {
        let target = self.pending_delete.take().ok_or(ClientError::NoPendingAction)?;
        let result = match target {
            DeleteTarget::User(user_id) => self.service.delete_user(user_id).await,
            DeleteTarget::Event(event_id) => self.service.delete_event(event_id).await,
        };
        match result {
            Ok(_) => {
                info!(%target, "admin: deleted");
                Ok(target)
            }
            Err(err) => {
                warn!(%target, "admin: delete failed: {err}");
                Err(err)
            }
        }
    }
}

pub fn format_stats(stats: &AdminStats) -> String {
    let mut lines = vec![
        format!("Users:            {}", stats.total_users),
        format!("Events:           {}", stats.total_events),
        format!("Enrollments:      {}", stats.total_enrollments),
        format!("Upcoming events:  {}", stats.upcoming_events),
        String::new(),
        "Events by type:".to_string(),
    ];

    if stats.events_by_type.is_empty() {
        lines.push("  No events yet".to_string());
    } else {
        lines.extend(
            stats
                .events_by_type
                .iter()
                .map(|item| format!("  {:<16}{}", item.event_type, item.count)),
        );
    }

    lines.push(String::new());
    lines.push("Popular events:".to_string());
    if stats.popular_events.is_empty() {
        lines.push("  No enrollments yet".to_string());
    } else {
        lines.extend(stats.popular_events.iter().enumerate().map(|(rank, event)| {
            format!(
                "  #{} {} ({} enrolled)",
                rank + 1,
                event.title,
                event.enrollment_count
            )
        }));
    }

    lines.join("\n")
}

pub fn format_event_details(details: &EventDetails) -> String {
    let mut text = format!(
        "Event: {}\nEnrolled: {} people\n\nParticipants:",
        details.event.title,
        details.participants.len()
    );
    for participant in &details.participants {
        text.push('\n');
        text.push_str(&participant.name);
    }
    text
}

pub fn format_user_enrollments(summary: &UserEnrollments) -> String {
    if summary.enrollments.is_empty() {
        return format!("{} has not enrolled in any events yet.", summary.user.name);
    }
    let mut text = format!("{}'s Enrollments:\n", summary.user.name);
    for enrollment in &summary.enrollments {
        text.push('\n');
        text.push_str(&format!("{} - {}", enrollment.title, enrollment.event_date));
    }
    text
}

#[cfg(test)]
#[path = "tests/admin_tests.rs"]
mod tests;
