use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(EventId);

/// An activity visitors can enroll in, as served by `GET /api/events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub event_type: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub event_time: String,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub enrolled_count: u32,
}

impl Event {
    /// Participant cap, if any. A stored cap of zero means unlimited.
    pub fn capacity(&self) -> Option<u32> {
        self.max_participants.filter(|max| *max > 0)
    }

    pub fn is_full(&self) -> bool {
        self.capacity()
            .is_some_and(|max| self.enrolled_count >= max)
    }
}

/// The visitor record remembered between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEnrollment {
    pub id: EventId,
    pub title: String,
    pub event_date: NaiveDate,
}
