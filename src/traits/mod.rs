//! Trait definitions for the dispatcher's collaborators
//!
//! These traits allow users to swap implementations or provide their own
//! for email transport, template loading, rendering and the recipient-override policy.

pub mod config;
pub mod mailer;
pub mod template;
