//! Event/Enrollment service contract and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    domain::{Event, EventId, Participant, UserEnrollment, UserId, UserRecord},
    error::ErrorBody,
    protocol::{
        Acknowledgement, AdminStats, EnrollRequest, EventDraft, RegisterRequest,
        RegisterResponse,
    },
};
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Calls the enrollment page depends on.
#[async_trait]
pub trait EventService: Send + Sync {
    async fn list_events(&self) -> ClientResult<Vec<Event>>;
    async fn register_identity(&self, request: RegisterRequest)
        -> ClientResult<RegisterResponse>;
    async fn create_enrollment(&self, request: EnrollRequest) -> ClientResult<Acknowledgement>;
}

/// Dashboard and event-authoring calls.
#[async_trait]
pub trait AdminService: EventService {
    async fn admin_stats(&self) -> ClientResult<AdminStats>;
    async fn list_users(&self) -> ClientResult<Vec<UserRecord>>;
    async fn fetch_user(&self, user_id: UserId) -> ClientResult<UserRecord>;
    async fn user_enrollments(&self, user_id: UserId) -> ClientResult<Vec<UserEnrollment>>;
    async fn fetch_event(&self, event_id: EventId) -> ClientResult<Event>;
    async fn event_enrollments(&self, event_id: EventId) -> ClientResult<Vec<Participant>>;
    async fn create_event(&self, draft: EventDraft) -> ClientResult<Acknowledgement>;
    async fn delete_event(&self, event_id: EventId) -> ClientResult<Acknowledgement>;
    async fn delete_user(&self, user_id: UserId) -> ClientResult<Acknowledgement>;
}

pub struct HttpEventService {
    http: Client,
    base_url: Url,
}

impl HttpEventService {
    pub fn new(server_url: &str) -> ClientResult<Self> {
        Self::with_timeout(server_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(server_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        decode_response(response).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let response = self.http.post(url).json(body).send().await?;
        decode_response(response).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "DELETE");
        let response = self.http.delete(url).send().await?;
        decode_response(response).await
    }
}

fn normalize_base_url(server_url: &str) -> ClientResult<Url> {
    let trimmed = server_url.trim();
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}

/// Maps a response onto `T`, turning non-2xx statuses and `{"error": ..}`
/// envelopes into [`ClientError::Server`].
async fn decode_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let value = if bytes.is_empty() {
        Some(Value::Object(Default::default()))
    } else {
        serde_json::from_slice::<Value>(&bytes).ok()
    };

    if !status.is_success() {
        let message = value
            .as_ref()
            .and_then(ErrorBody::from_value)
            .map(|body| body.error)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(ClientError::server(status.as_u16(), message));
    }

    let value = value.ok_or_else(|| ClientError::Decode("response body is not JSON".into()))?;
    if let Some(body) = ErrorBody::from_value(&value) {
        return Err(ClientError::server(status.as_u16(), body.error));
    }
    serde_json::from_value(value).map_err(|err| ClientError::Decode(err.to_string()))
}

#[async_trait]
impl EventService for HttpEventService {
    async fn list_events(&self) -> ClientResult<Vec<Event>> {
        self.get("/api/events").await
    }

    async fn register_identity(
        &self,
        request: RegisterRequest,
    ) -> ClientResult<RegisterResponse> {
        self.post("/api/user/add", &request).await
    }

    async fn create_enrollment(&self, request: EnrollRequest) -> ClientResult<Acknowledgement> {
        self.post("/api/enroll", &request).await
    }
}

#[async_trait]
impl AdminService for HttpEventService {
    async fn admin_stats(&self) -> ClientResult<AdminStats> {
        self.get("/api/admin/stats").await
    }

    async fn list_users(&self) -> ClientResult<Vec<UserRecord>> {
        self.get("/api/users").await
    }

    async fn fetch_user(&self, user_id: UserId) -> ClientResult<UserRecord> {
        self.get(&format!("/api/user/{user_id}")).await
    }

    async fn user_enrollments(&self, user_id: UserId) -> ClientResult<Vec<UserEnrollment>> {
        self.get(&format!("/api/user/{user_id}/enrollments")).await
    }

    async fn fetch_event(&self, event_id: EventId) -> ClientResult<Event> {
        self.get(&format!("/api/event/{event_id}")).await
    }

    async fn event_enrollments(&self, event_id: EventId) -> ClientResult<Vec<Participant>> {
        self.get(&format!("/api/event/{event_id}/enrollments")).await
    }

    async fn create_event(&self, draft: EventDraft) -> ClientResult<Acknowledgement> {
        self.post("/api/event/add", &draft).await
    }

    async fn delete_event(&self, event_id: EventId) -> ClientResult<Acknowledgement> {
        self.delete(&format!("/api/event/delete/{event_id}")).await
    }

    async fn delete_user(&self, user_id: UserId) -> ClientResult<Acknowledgement> {
        self.delete(&format!("/api/user/delete/{user_id}")).await
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
