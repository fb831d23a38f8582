use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{AppError, SyncOperation};
use crate::users::UserRepository;
use crate::webhook::event::ClerkEvent;

/// What a delivery did to the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Created { id: Uuid },
    AlreadyExists,
    Updated { id: Uuid },
    UnknownUser,
    Ignored { event_type: String },
}

/// Routes a verified event to the matching repository mutation.
///
/// Payload extraction happens before any repository call, so a malformed
/// event never touches the table.
pub async fn dispatch_event(
    users: &dyn UserRepository,
    event: ClerkEvent,
) -> Result<DispatchOutcome, AppError> {
    match event {
        ClerkEvent::UserCreated(data) => {
            let new_user = data.to_new_user()?;
            info!(clerk_id = %new_user.clerk_id, "Processing user.created event");

            let created = users
                .create_if_absent(&new_user)
                .await
                .map_err(|source| AppError::UserSync {
                    operation: SyncOperation::Create,
                    source,
                })?;

            Ok(match created {
                Some(id) => {
                    info!(clerk_id = %new_user.clerk_id, %id, "User created");
                    DispatchOutcome::Created { id }
                }
                None => {
                    info!(clerk_id = %new_user.clerk_id, "User already synced, skipping insert");
                    DispatchOutcome::AlreadyExists
                }
            })
        }
        ClerkEvent::UserUpdated(data) => {
            let profile = data.profile()?;
            info!(clerk_id = %data.id, "Processing user.updated event");

            let updated = users
                .update_if_present(&data.id, &profile)
                .await
                .map_err(|source| AppError::UserSync {
                    operation: SyncOperation::Update,
                    source,
                })?;

            Ok(match updated {
                Some(id) => {
                    info!(clerk_id = %data.id, %id, "User updated");
                    DispatchOutcome::Updated { id }
                }
                None => {
                    warn!(clerk_id = %data.id, "No local user for update, skipping");
                    DispatchOutcome::UnknownUser
                }
            })
        }
        ClerkEvent::Unrecognized { event_type, data } => {
            info!(%event_type, "Ignoring unhandled webhook event");
            debug!(%event_type, payload = %data, "Unhandled event payload");
            Ok(DispatchOutcome::Ignored { event_type })
        }
    }
}
