//! Event creation: register the organizer, then post the event.

use chrono::NaiveDate;
use shared::{
    domain::UserId,
    protocol::{Acknowledgement, EventDraft, RegisterRequest},
};
use tracing::{info, warn};

use crate::{
    error::{ClientError, ClientResult},
    service::{AdminService, EventService},
};

#[derive(Debug, Clone)]
pub struct EventSubmission {
    pub created_by: Option<UserId>,
    pub acknowledgement: Acknowledgement,
}

/// Local checks before anything is sent. The event date may not lie before `today`.
pub fn validate_draft(draft: &EventDraft, today: NaiveDate) -> ClientResult<()> {
    if draft.title.trim().is_empty() {
        return Err(ClientError::InvalidDraft("Event title is required".into()));
    }
    if draft.event_type.trim().is_empty() {
        return Err(ClientError::InvalidDraft("Event type is required".into()));
    }
    if draft.event_date < today {
        return Err(ClientError::InvalidDraft(format!(
            "Event date {} is in the past",
            draft.event_date
        )));
    }
    if draft.max_participants == Some(0) {
        return Err(ClientError::InvalidDraft(
            "Maximum participants must be at least 1".into(),
        ));
    }
    Ok(())
}

// TODO: replace with a lookup-by-email endpoint once the service exposes one;
// this depends on the wording of the service's uniqueness error.
pub fn is_duplicate_identity(err: &ClientError) -> bool {
    err.server_message().is_some_and(|message| {
        let message = message.to_ascii_lowercase();
        message.contains("unique") || message.contains("already exists")
    })
}

/// Organizer id for the draft: a fresh registration, or the existing record
/// when the email is already registered. Other failures yield `None`.
pub async fn resolve_organizer(
    service: &dyn AdminService,
    organizer: RegisterRequest,
) -> ClientResult<Option<UserId>> {
    let email = organizer.email.clone();
    match service.register_identity(organizer).await {
        Ok(response) => Ok(Some(response.id)),
        Err(err) if is_duplicate_identity(&err) => {
            info!("draft: organizer already registered, looking up by email");
            let users = service.list_users().await?;
            Ok(users
                .into_iter()
                .find(|user| user.email == email)
                .map(|user| user.id))
        }
        Err(err) if err.is_transport() => Err(err),
        Err(err) => {
            warn!("draft: organizer registration failed, creating event without organizer: {err}");
            Ok(None)
        }
    }
}

pub async fn submit_event(
    service: &dyn AdminService,
    mut draft: EventDraft,
    organizer: RegisterRequest,
) -> ClientResult<EventSubmission> {
    draft.created_by = resolve_organizer(service, organizer).await?;
    let created_by = draft.created_by;
    let acknowledgement = service.create_event(draft).await?;
    info!(organizer = ?created_by.map(|id| id.0), "draft: event created");
    Ok(EventSubmission {
        created_by,
        acknowledgement,
    })
}
