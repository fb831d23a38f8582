//! Clerk webhook intake: Svix verification, event parsing, dispatch to the
//! user repository.

pub mod dispatch;
pub mod event;
pub mod handlers;
pub mod signature;
