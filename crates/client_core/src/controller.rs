//! Enrollment page controller: owns the fetched events, the recognized visitor
//! and the active filter, and keeps the rendered surface in sync with them.

use std::sync::Arc;

use shared::{
    domain::{Event, EventId, Identity},
    protocol::{EnrollRequest, RegisterRequest},
};
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, ClientResult},
    render::{render_event_list, StatusBanner, LOAD_ERROR_MARKUP},
    service::EventService,
    store::{load_identity, save_identity, IdentityStore},
    view::{derive_view, EnrollAction, TypeFilter, ViewFilter},
};

/// User inputs the page reacts to.
#[derive(Debug, Clone)]
pub enum Trigger {
    SubmitRegistration { name: String, email: String },
    SearchChanged(String),
    TypeFilterChanged(TypeFilter),
    EnrollClicked(EventId),
    ConfirmEnrollment,
    DismissEnrollment,
}

impl Trigger {
    fn name(&self) -> &'static str {
        match self {
            Self::SubmitRegistration { .. } => "submit_registration",
            Self::SearchChanged(_) => "search_changed",
            Self::TypeFilterChanged(_) => "type_filter_changed",
            Self::EnrollClicked(_) => "enroll_clicked",
            Self::ConfirmEnrollment => "confirm_enrollment",
            Self::DismissEnrollment => "dismiss_enrollment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentPrompt {
    pub event_id: EventId,
    pub message: String,
}

/// What the page currently shows.
#[derive(Debug, Clone, Default)]
pub struct PageSurface {
    pub events_markup: String,
    pub user_status: Option<StatusBanner>,
    pub alert: Option<String>,
    pub confirmation: Option<EnrollmentPrompt>,
}

pub struct EnrollmentController {
    service: Arc<dyn EventService>,
    store: Arc<dyn IdentityStore>,
    events: Vec<Event>,
    identity: Option<Identity>,
    filter: ViewFilter,
    pending_event: Option<EventId>,
    load_failed: bool,
    surface: PageSurface,
}

impl EnrollmentController {
    pub fn new(service: Arc<dyn EventService>, store: Arc<dyn IdentityStore>) -> Self {
        Self {
            service,
            store,
            events: Vec::new(),
            identity: None,
            filter: ViewFilter::default(),
            pending_event: None,
            load_failed: false,
            surface: PageSurface::default(),
        }
    }

    /// Page-load sequence. A failed fetch does not prevent identity restore;
    /// its error is returned after both steps have run.
    pub async fn initialize(&mut self) -> ClientResult<()> {
        let loaded = self.refresh_events().await;
        self.restore_identity();
        loaded
    }

    pub fn restore_identity(&mut self) -> Option<&Identity> {
        let identity = load_identity(self.store.as_ref())?;
        info!(user_id = identity.id.0, "enroll: restored remembered identity");
        self.surface.user_status = Some(StatusBanner::success(format!(
            "Welcome back, {}!",
            identity.name
        )));
        self.identity = Some(identity);
        self.rerender();
        self.identity.as_ref()
    }

    /// Replaces the collection with a fresh fetch. On failure the list shows
    /// an error placeholder until the next successful fetch, and the collection
    /// is left as it was.
    pub async fn refresh_events(&mut self) -> ClientResult<()> {
        match self.service.list_events().await {
            Ok(events) => {
                info!(count = events.len(), "enroll: loaded events");
                self.events = events;
                self.load_failed = false;
                self.rerender();
                Ok(())
            }
            Err(err) => {
                warn!("enroll: failed to load events: {err}");
                self.load_failed = true;
                self.rerender();
                Err(err)
            }
        }
    }

    pub async fn register(&mut self, name: &str, email: &str) -> ClientResult<Identity> {
        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
        };
        let response = match self.service.register_identity(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!("enroll: registration failed: {err}");
                let message = if err.is_transport() {
                    "Registration failed. Please try again.".to_string()
                } else {
                    err.user_message()
                };
                self.surface.user_status = Some(StatusBanner::danger(message));
                return Err(err);
            }
        };

        let identity = Identity {
            id: response.id,
            name: name.to_string(),
            email: email.to_string(),
        };
        if let Err(err) = save_identity(self.store.as_ref(), &identity) {
            warn!("enroll: identity registered but not persisted: {err:#}");
        }
        info!(user_id = identity.id.0, "enroll: registered identity");

        self.identity = Some(identity.clone());
        self.surface.user_status = Some(StatusBanner::success(
            "Registration successful! You can now enroll in events.",
        ));
        self.rerender();
        Ok(identity)
    }

    /// First half of the two-step enrollment. Never touches the network.
    pub fn request_enrollment(&mut self, event_id: EventId) -> ClientResult<EnrollmentPrompt> {
        match self.check_enrollable(event_id) {
            Ok(title) => {
                let prompt = EnrollmentPrompt {
                    event_id,
                    message: format!("Are you sure you want to enroll in \"{title}\"?"),
                };
                self.pending_event = Some(event_id);
                self.surface.confirmation = Some(prompt.clone());
                Ok(prompt)
            }
            Err(err) => {
                self.surface.alert = Some(err.user_message());
                Err(err)
            }
        }
    }

    fn check_enrollable(&self, event_id: EventId) -> ClientResult<String> {
        if self.identity.is_none() {
            return Err(ClientError::NotRegistered);
        }
        let event = self
            .events
            .iter()
            .find(|event| event.id == event_id)
            .ok_or(ClientError::UnknownEvent(event_id))?;
        if event.is_full() {
            return Err(ClientError::EventFull(event_id));
        }
        Ok(event.title.clone())
    }

    /// Commits the pending enrollment. The pending event is consumed whether
    /// or not the call succeeds.
    pub async fn confirm_enrollment(&mut self) -> ClientResult<()> {
        self.surface.confirmation = None;
        let event_id = self.pending_event.take().ok_or(ClientError::NoPendingAction)?;
        let user_id = self
            .identity
            .as_ref()
            .map(|identity| identity.id)
            .ok_or(ClientError::NotRegistered)?;

        match self
            .service
            .create_enrollment(EnrollRequest { event_id, user_id })
            .await
        {
            Ok(_) => {
                info!(event_id = event_id.0, user_id = user_id.0, "enroll: enrollment created");
                self.surface.alert = Some("Enrollment successful!".to_string());
                if let Err(err) = self.refresh_events().await {
                    debug!("enroll: refresh after enrollment failed: {err}");
                }
                Ok(())
            }
            Err(err) => {
                warn!(event_id = event_id.0, "enroll: enrollment failed: {err}");
                let message = if err.is_transport() {
                    "Enrollment failed. Please try again.".to_string()
                } else {
                    err.user_message()
                };
                self.surface.alert = Some(message);
                Err(err)
            }
        }
    }

    pub fn cancel_enrollment(&mut self) {
        self.pending_event = None;
        self.surface.confirmation = None;
    }

    pub fn set_search_text(&mut self, search_text: impl Into<String>) {
        self.filter.search_text = search_text.into();
        self.rerender();
    }

    pub fn set_type_filter(&mut self, type_filter: TypeFilter) {
        self.filter.type_filter = type_filter;
        self.rerender();
    }

    /// Single entry point for page inputs.
    pub async fn handle(&mut self, trigger: Trigger) -> Option<EnrollmentPrompt> {
        debug!(trigger = trigger.name(), "enroll: handling trigger");
        match trigger {
            Trigger::SubmitRegistration { name, email } => {
                if let Err(err) = self.register(&name, &email).await {
                    debug!("enroll: registration trigger failed: {err}");
                }
                None
            }
            Trigger::SearchChanged(text) => {
                self.set_search_text(text);
                None
            }
            Trigger::TypeFilterChanged(type_filter) => {
                self.set_type_filter(type_filter);
                None
            }
            Trigger::EnrollClicked(event_id) => self.request_enrollment(event_id).ok(),
            Trigger::ConfirmEnrollment => {
                if let Err(err) = self.confirm_enrollment().await {
                    debug!("enroll: confirmation trigger failed: {err}");
                }
                None
            }
            Trigger::DismissEnrollment => {
                self.cancel_enrollment();
                None
            }
        }
    }

    pub fn visible_events(&self) -> Vec<&Event> {
        derive_view(&self.events, &self.filter)
    }

    pub fn enroll_action(&self, event: &Event) -> EnrollAction {
        EnrollAction::for_event(event, self.identity.is_some())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    pub fn pending_event(&self) -> Option<EventId> {
        self.pending_event
    }

    pub fn surface(&self) -> &PageSurface {
        &self.surface
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.surface.alert.take()
    }

    fn rerender(&mut self) {
        self.surface.events_markup = if self.load_failed {
            LOAD_ERROR_MARKUP.to_string()
        } else {
            render_event_list(&self.visible_events(), self.identity.is_some())
        };
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
