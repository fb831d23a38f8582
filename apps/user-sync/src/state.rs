use std::sync::Arc;

use crate::users::UserRepository;
use crate::webhook::signature::WebhookVerifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable user store. Default: PgUserRepository.
    pub users: Arc<dyn UserRepository>,
    /// Built once at startup from the configured signing secret.
    pub verifier: Arc<WebhookVerifier>,
}
