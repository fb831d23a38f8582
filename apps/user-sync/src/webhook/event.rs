use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::user::{NewUser, UserProfile};

pub const USER_CREATED: &str = "user.created";
pub const USER_UPDATED: &str = "user.updated";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid webhook envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("invalid {event_type} data: {source}")]
    UserData {
        event_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("user {clerk_id} has no email addresses")]
    NoEmailAddress { clerk_id: String },
}

/// The canonical `{ type, data }` envelope as delivered.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: Value,
}

/// A verified Clerk event, closed over the kinds this service handles.
#[derive(Debug)]
pub enum ClerkEvent {
    UserCreated(UserData),
    UserUpdated(UserData),
    Unrecognized { event_type: String, data: Value },
}

impl ClerkEvent {
    /// Parses a verified request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        let envelope: Envelope = serde_json::from_slice(body).map_err(PayloadError::Envelope)?;
        let user_data = |event_type: &'static str, data: Value| {
            serde_json::from_value::<UserData>(data)
                .map_err(|source| PayloadError::UserData { event_type, source })
        };

        Ok(match envelope.event_type.as_str() {
            USER_CREATED => ClerkEvent::UserCreated(user_data(USER_CREATED, envelope.data)?),
            USER_UPDATED => ClerkEvent::UserUpdated(user_data(USER_UPDATED, envelope.data)?),
            _ => ClerkEvent::Unrecognized {
                event_type: envelope.event_type,
                data: envelope.data,
            },
        })
    }

    pub fn event_type(&self) -> &str {
        match self {
            ClerkEvent::UserCreated(_) => USER_CREATED,
            ClerkEvent::UserUpdated(_) => USER_UPDATED,
            ClerkEvent::Unrecognized { event_type, .. } => event_type.as_str(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
    pub email_address: String,
}

/// The subset of Clerk's user object this service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
}

impl UserData {
    /// First and last name joined by a single space, edges trimmed.
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    /// The first listed email address.
    pub fn primary_email(&self) -> Result<&str, PayloadError> {
        self.email_addresses
            .first()
            .map(|e| e.email_address.as_str())
            .ok_or_else(|| PayloadError::NoEmailAddress {
                clerk_id: self.id.clone(),
            })
    }

    pub fn profile(&self) -> Result<UserProfile, PayloadError> {
        Ok(UserProfile {
            email: self.primary_email()?.to_string(),
            name: self.display_name(),
            image: self.image_url.clone(),
        })
    }

    pub fn to_new_user(&self) -> Result<NewUser, PayloadError> {
        Ok(NewUser {
            clerk_id: self.id.clone(),
            profile: self.profile()?,
        })
    }
}
