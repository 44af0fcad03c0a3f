//! Tests for transport failures, error-chain reporting and subscriber failures

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use template_mailer::template::{InMemoryTemplateStore, TemplateMessage, TemplatePipeline};
use template_mailer::{
    Dispatcher, Email, Mailer, SendOptions, Settings, TransportError, SEND_ERROR_PREFIX,
};

/// Mailer that fails with an error chain of the given messages, outermost first
struct FailingMailer {
    chain: Vec<&'static str>,
    attempts: AtomicUsize,
}

impl FailingMailer {
    fn new(chain: Vec<&'static str>) -> Self {
        Self {
            chain,
            attempts: AtomicUsize::new(0),
        }
    }

    fn error(&self) -> TransportError {
        let mut messages = self.chain.iter().rev();
        let innermost = TransportError::new(*messages.next().expect("chain must not be empty"));
        messages.fold(innermost, |inner, message| TransportError::with_source(*message, inner))
    }
}

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _settings: &Settings, _email: &Email) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(self.error())
    }

    fn is_healthy(&self) -> bool {
        false
    }
}

struct OkMailer;

#[async_trait]
impl Mailer for OkMailer {
    async fn send(&self, _settings: &Settings, _email: &Email) -> Result<(), TransportError> {
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

type Log = Arc<Mutex<Vec<String>>>;

fn bound_dispatcher(mailer: Arc<dyn Mailer>, log: &Log) -> Dispatcher {
    let store = InMemoryTemplateStore::new()
        .with_template("welcome", TemplateMessage::new("Welcome", "Hello", false));

    let sent = log.clone();
    let failed = log.clone();
    let completed = log.clone();
    let after = log.clone();
    let logger = log.clone();

    let mut dispatcher = Dispatcher::builder(Settings::new("smtp.test"))
        .mailer(mailer)
        .templates(Arc::new(store))
        .build()
        .on_sent(move |_| sent.lock().unwrap().push("sent".to_string()))
        .on_failed(move |_| failed.lock().unwrap().push("failed".to_string()))
        .on_completed(move |outcome| {
            completed
                .lock()
                .unwrap()
                .push(format!("completed({}):{}", outcome.success, outcome.error))
        })
        .after_complete(move || after.lock().unwrap().push("after_complete".to_string()))
        .log_exception_with(move |prefix, cause| {
            logger
                .lock()
                .unwrap()
                .push(format!("log[{}] {}", prefix, cause))
        });

    dispatcher
        .apply_template("welcome", TemplatePipeline::new())
        .expect("template should load");
    dispatcher
}

#[tokio::test]
async fn test_failure_with_nested_cause() {
    let log: Log = Arc::default();
    let mailer = Arc::new(FailingMailer::new(vec!["outer failure", "inner failure"]));
    let dispatcher = bound_dispatcher(mailer.clone(), &log);

    // Transport errors are absorbed
    let result = dispatcher.send_mail("a@x.com", SendOptions::new()).await;
    assert!(result.is_ok());

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "failed".to_string(),
            format!("log[{}] outer failure", SEND_ERROR_PREFIX),
            format!("log[{}] inner failure", SEND_ERROR_PREFIX),
            "after_complete".to_string(),
            "completed(false):outer failure inner failure".to_string(),
        ]
    );
    assert_eq!(mailer.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_logger_called_once_per_cause() {
    for depth in 1..=4 {
        let log: Log = Arc::default();
        let chain: Vec<&'static str> = ["l0", "l1", "l2", "l3"][..depth].to_vec();
        let dispatcher = bound_dispatcher(Arc::new(FailingMailer::new(chain.clone())), &log);

        dispatcher
            .send_mail("a@x.com", SendOptions::new())
            .await
            .unwrap();

        let entries = log.lock().unwrap().clone();
        let logged = entries.iter().filter(|e| e.starts_with("log[")).count();
        assert_eq!(logged, depth);

        let completed = entries.last().unwrap();
        let text = completed.trim_start_matches("completed(false):");
        assert_eq!(text.split(' ').collect::<Vec<_>>(), chain);
    }
}

#[tokio::test]
async fn test_failure_without_logger() {
    let store = InMemoryTemplateStore::new()
        .with_template("welcome", TemplateMessage::new("Welcome", "Hello", false));
    let outcome = Arc::new(Mutex::new(None));
    let outcome_in = outcome.clone();

    let mut dispatcher = Dispatcher::builder(Settings::new("smtp.test"))
        .mailer(Arc::new(FailingMailer::new(vec!["refused"])))
        .templates(Arc::new(store))
        .build()
        .on_completed(move |o| *outcome_in.lock().unwrap() = Some((o.success, o.error.clone())));
    dispatcher
        .apply_template("welcome", TemplatePipeline::new())
        .unwrap();

    dispatcher
        .send_mail("a@x.com", SendOptions::new())
        .await
        .unwrap();

    assert_eq!(
        outcome.lock().unwrap().clone(),
        Some((false, "refused".to_string()))
    );
}

#[tokio::test]
async fn test_success_fires_completed_once_with_empty_error() {
    let log: Log = Arc::default();
    let dispatcher = bound_dispatcher(Arc::new(OkMailer), &log);

    dispatcher
        .send_mail_to_many(["a@x.com", "b@x.com"], SendOptions::new())
        .await
        .unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["sent", "after_complete", "completed(true):"]
    );
}

#[tokio::test]
async fn test_each_send_completes_exactly_once() {
    let log: Log = Arc::default();
    let dispatcher = bound_dispatcher(Arc::new(FailingMailer::new(vec!["down"])), &log);

    for _ in 0..3 {
        dispatcher
            .send_mail("a@x.com", SendOptions::new())
            .await
            .unwrap();
    }

    let entries = log.lock().unwrap().clone();
    let completed = entries.iter().filter(|e| e.starts_with("completed")).count();
    let after = entries.iter().filter(|e| *e == "after_complete").count();
    assert_eq!(completed, 3);
    assert_eq!(after, 3);
}

#[tokio::test]
async fn test_panicking_subscriber_propagates() {
    let log: Log = Arc::default();
    let later = log.clone();
    let dispatcher = bound_dispatcher(Arc::new(OkMailer), &log)
        .on_sent(|_| panic!("subscriber failed"))
        .on_sent(move |_| later.lock().unwrap().push("later subscriber".to_string()));

    let result = AssertUnwindSafe(dispatcher.send_mail("a@x.com", SendOptions::new()))
        .catch_unwind()
        .await;

    assert!(result.is_err());
    // Earlier subscribers ran; later ones and the completion stage did not
    assert_eq!(*log.lock().unwrap(), vec!["sent"]);
}
