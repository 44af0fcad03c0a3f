//! Send notifications and caller hooks
//!
//! Each send attempt that reaches rendering fires exactly one of `Sent` or
//! `Failed`, followed by exactly one `Completed`. Subscribers of each kind run
//! synchronously, in registration order, on the task that called `send_mail`.
//!
//! Subscribers are not isolated from each other: a panicking subscriber
//! unwinds out of `send_mail`, and the subscribers, hooks and notifications
//! that would have run after it are skipped.

use crate::traits::mailer::Email;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

type MessageHandler = Arc<dyn Fn(&Email) + Send + Sync>;
type CompletedHandler = Arc<dyn Fn(&SendOutcome<'_>) + Send + Sync>;

/// Hook run after every send attempt, before `Completed` fires
pub type AfterCompleteHook = Arc<dyn Fn() + Send + Sync>;

/// Hook run once per cause in a transport failure's error chain
pub type ExceptionLogger = Arc<dyn Fn(&str, &(dyn StdError + 'static)) + Send + Sync>;

/// Result of one send attempt, handed to `Completed` subscribers
#[derive(Debug)]
pub struct SendOutcome<'a> {
    pub success: bool,
    /// Messages of every cause in the failure chain, outermost first,
    /// separated by single spaces; empty on success
    pub error: String,
    pub message: &'a Email,
}

/// Ordered subscriber lists for the three notification kinds
#[derive(Clone, Default)]
pub struct Notifications {
    sent: Vec<MessageHandler>,
    failed: Vec<MessageHandler>,
    completed: Vec<CompletedHandler>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_sent<F>(&mut self, handler: F)
    where
        F: Fn(&Email) + Send + Sync + 'static,
    {
        self.sent.push(Arc::new(handler));
    }

    pub fn subscribe_failed<F>(&mut self, handler: F)
    where
        F: Fn(&Email) + Send + Sync + 'static,
    {
        self.failed.push(Arc::new(handler));
    }

    pub fn subscribe_completed<F>(&mut self, handler: F)
    where
        F: Fn(&SendOutcome<'_>) + Send + Sync + 'static,
    {
        self.completed.push(Arc::new(handler));
    }

    pub fn emit_sent(&self, email: &Email) {
        for handler in &self.sent {
            handler(email);
        }
    }

    pub fn emit_failed(&self, email: &Email) {
        for handler in &self.failed {
            handler(email);
        }
    }

    pub fn emit_completed(&self, outcome: &SendOutcome<'_>) {
        for handler in &self.completed {
            handler(outcome);
        }
    }

    /// Number of subscribers across all kinds
    pub fn len(&self) -> usize {
        self.sent.len() + self.failed.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Notifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifications")
            .field("sent", &self.sent.len())
            .field("failed", &self.failed.len())
            .field("completed", &self.completed.len())
            .finish()
    }
}
