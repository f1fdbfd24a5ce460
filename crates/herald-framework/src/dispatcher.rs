//! The command dispatcher.
//!
//! For every update the dispatcher runs the same pipeline:
//!
//! ```text
//! classify ─► events ─► extract ─► resolve ─► bind ─► execute ─► report
//!    │                     │          │         └────────┴──► CommandFailed
//!    └─► Malformed         │          └─► CommandNotFound
//!                          └─► NoCommand / NotAddressed
//! ```
//!
//! Failures of a handler never escape [`CommandDispatcher::dispatch`]: errors
//! and panics are caught at the execution boundary and reported through the
//! command's failure hook and the notification sink. At most one command runs
//! per update, exactly once.

use std::any::Any;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use herald_core::{MalformedUpdate, Update};
use serde_json::Value;
use tower::Service;
use tracing::{Instrument, Level, debug, span, trace, warn};

use crate::binder;
use crate::bot::BoxedBot;
use crate::command::Command;
use crate::context::CommandContext;
use crate::error::CommandError;
use crate::failure::{CommandFailure, FailureDisposition};
use crate::notification::{Notification, NotificationSink, TracingSink};
use crate::parse::{CommandParser, Extraction, Invocation};
use crate::registry::CommandRegistry;

/// How the dispatch of one update ended.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The update had no single content key.
    Malformed(MalformedUpdate),
    /// The update carries no command, or is not a command-bearing type.
    NoCommand,
    /// The command token mentions a different bot.
    NotAddressed { name: String, mention: String },
    /// No command is registered under the name.
    NotFound { name: String },
    Succeeded {
        command: String,
        output: Option<Value>,
    },
    Failed {
        command: String,
        error: Arc<CommandError>,
    },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// The name of the command that ran, if one did.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Succeeded { command, .. } | Self::Failed { command, .. } => Some(command),
            _ => None,
        }
    }

    pub fn output(&self) -> Option<&Value> {
        match self {
            Self::Succeeded { output, .. } => output.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<CommandError>> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Resolves and runs commands for one bot.
///
/// Cloning is cheap; all clones share the registry and the sink.
#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
    parser: CommandParser,
    sink: Arc<dyn NotificationSink>,
    emit_events: bool,
}

impl CommandDispatcher {
    /// Creates a dispatcher that logs notifications with [`TracingSink`].
    pub fn new(registry: impl Into<Arc<CommandRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            parser: CommandParser::default(),
            sink: Arc::new(TracingSink),
            emit_events: true,
        }
    }

    pub fn with_parser(mut self, parser: CommandParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn with_shared_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Whether classifier events (`update`, `message`, ...) are emitted.
    pub fn emit_update_events(mut self, enabled: bool) -> Self {
        self.emit_events = enabled;
        self
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn parser(&self) -> &CommandParser {
        &self.parser
    }

    /// Dispatches one update to completion.
    pub async fn dispatch(&self, update: Update, bot: BoxedBot) -> DispatchOutcome {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            bot = bot.name(),
            update_id = ?update.id(),
        );
        self.dispatch_inner(update, bot).instrument(span).await
    }

    async fn dispatch_inner(&self, update: Update, bot: BoxedBot) -> DispatchOutcome {
        let update_type = match update.classify() {
            Ok(update_type) => update_type.to_owned(),
            Err(err) => {
                warn!(error = %err, "Malformed update");
                self.emit_events(&update, &bot);
                return DispatchOutcome::Malformed(err);
            }
        };
        trace!(update_type = %update_type, subtype = ?update.payload_subtype(), "Classified update");
        self.emit_events(&update, &bot);

        match self.parser.extract(&update) {
            Extraction::NotApplicable | Extraction::NoCommand => DispatchOutcome::NoCommand,
            Extraction::NotAddressed { name, mention } => {
                debug!(command = %name, mention = %mention, "Command addressed to another bot");
                DispatchOutcome::NotAddressed { name, mention }
            }
            Extraction::Command(invocation) => self.execute(invocation, update, bot).await,
        }
    }

    fn emit_events(&self, update: &Update, bot: &BoxedBot) {
        if !self.emit_events {
            return;
        }
        for name in update.event_names() {
            self.sink.emit(Notification::Event {
                name,
                bot: bot.clone(),
                update: update.clone(),
            });
        }
    }

    async fn execute(
        &self,
        invocation: Invocation,
        update: Update,
        bot: BoxedBot,
    ) -> DispatchOutcome {
        let Some(command) = self.registry.resolve(&invocation.name).cloned() else {
            debug!(command = %invocation.name, "Command not found");
            self.sink.emit(Notification::CommandNotFound {
                name: invocation.name.clone(),
                bot,
                update,
            });
            return DispatchOutcome::NotFound {
                name: invocation.name,
            };
        };

        debug!(
            command = command.name(),
            invoked_as = %invocation.name,
            args = invocation.arguments.len(),
            "Executing command"
        );

        let result = match binder::bind(command.arguments(), &invocation) {
            Ok(arguments) => {
                let ctx = Arc::new(CommandContext::new(
                    update.clone(),
                    bot.clone(),
                    command.clone(),
                    invocation,
                    arguments,
                ));
                let handler = command.handler().clone();
                AssertUnwindSafe(async move { handler.invoke(ctx).await })
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| Err(CommandError::Panicked(panic_message(&*panic))))
            }
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(output) => {
                debug!(command = command.name(), "Command succeeded");
                DispatchOutcome::Succeeded {
                    command: command.name().to_owned(),
                    output,
                }
            }
            Err(error) => self.report_failure(command, error, update, bot).await,
        }
    }

    async fn report_failure(
        &self,
        command: Arc<Command>,
        error: CommandError,
        update: Update,
        bot: BoxedBot,
    ) -> DispatchOutcome {
        let error = Arc::new(error);
        warn!(command = command.name(), error = %error, "Command failed");

        let disposition = match command.failure_hook() {
            Some(hook) => {
                let failure = CommandFailure {
                    command: command.clone(),
                    error: error.clone(),
                    update: update.clone(),
                    bot: bot.clone(),
                };
                AssertUnwindSafe(hook.on_failure(&failure))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        warn!(
                            command = command.name(),
                            panic = %panic_message(&*panic),
                            "Failure hook panicked"
                        );
                        FailureDisposition::Notify
                    })
            }
            None => FailureDisposition::Notify,
        };

        if disposition == FailureDisposition::Notify {
            self.sink.emit(Notification::CommandFailed {
                name: command.name().to_owned(),
                handler: command.handler().kind().clone(),
                error: error.clone(),
                bot,
                update,
            });
        } else {
            debug!(command = command.name(), "Failure notification suppressed by hook");
        }

        DispatchOutcome::Failed {
            command: command.name().to_owned(),
            error,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("registry", &self.registry)
            .field("parser", &self.parser)
            .field("emit_events", &self.emit_events)
            .finish()
    }
}

// ============================================================================
// tower integration
// ============================================================================

/// One unit of work for the dispatcher as a [`Service`].
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub update: Update,
    pub bot: BoxedBot,
}

impl DispatchRequest {
    pub fn new(update: Update, bot: BoxedBot) -> Self {
        Self { update, bot }
    }
}

impl Service<DispatchRequest> for CommandDispatcher {
    type Response = DispatchOutcome;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<DispatchOutcome, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DispatchRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { Ok(this.dispatch(req.update, req.bot).await) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::bot::BotInfo;
    use crate::error::BindingError;
    use crate::extractor::Args;
    use crate::handler::HandlerRef;

    #[derive(Default, Clone)]
    struct Recorder(Arc<Mutex<Vec<Notification>>>);

    impl Recorder {
        fn sink(&self) -> impl NotificationSink + 'static {
            let inner = self.0.clone();
            move |n: Notification| inner.lock().push(n)
        }

        fn names(&self) -> Vec<String> {
            self.0.lock().iter().map(|n| n.name().to_owned()).collect()
        }

        fn failures(&self) -> Vec<Arc<CommandError>> {
            self.0
                .lock()
                .iter()
                .filter_map(|n| match n {
                    Notification::CommandFailed { error, .. } => Some(error.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    fn text_update(text: &str) -> Update {
        Update::from_value(json!({"update_id": 1, "message": {"text": text}})).unwrap()
    }

    fn bot() -> BoxedBot {
        BotInfo::new("test").with_username("herald_bot").boxed()
    }

    fn dispatcher(registry: CommandRegistry, recorder: &Recorder) -> CommandDispatcher {
        CommandDispatcher::new(registry)
            .with_parser(CommandParser::new().with_username("herald_bot"))
            .with_sink(recorder.sink())
    }

    #[test]
    fn test_invokes_handler_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = CommandRegistry::new();
        registry
            .register(Command::new(
                "image",
                HandlerRef::callable(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        "sent"
                    }
                }),
            ))
            .unwrap();

        let recorder = Recorder::default();
        let outcome = tokio_test::block_on(
            dispatcher(registry, &recorder).dispatch(text_update("/image"), bot()),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.command(), Some("image"));
        assert_eq!(outcome.output(), Some(&json!("sent")));
        assert_eq!(recorder.names(), ["update", "message", "message.text"]);
    }

    #[test]
    fn test_not_found() {
        let recorder = Recorder::default();
        let outcome = tokio_test::block_on(
            dispatcher(CommandRegistry::new(), &recorder)
                .emit_update_events(false)
                .dispatch(text_update("/doesnotexist"), bot()),
        );
        assert!(matches!(outcome, DispatchOutcome::NotFound { ref name } if name == "doesnotexist"));
        assert_eq!(recorder.names(), ["command.not_found"]);
    }

    #[test]
    fn test_error_yields_one_failure() {
        let mut registry = CommandRegistry::new();
        registry
            .register(Command::new(
                "boom",
                HandlerRef::callable(|| async {
                    Err::<(), _>(std::io::Error::other("disk on fire"))
                }),
            ))
            .unwrap();

        let recorder = Recorder::default();
        let outcome = tokio_test::block_on(
            dispatcher(registry, &recorder).dispatch(text_update("/boom"), bot()),
        );

        assert!(outcome.is_failure());
        let failures = recorder.failures();
        assert_eq!(failures.len(), 1);
        assert!(matches!(&*failures[0], CommandError::Handler(e) if e.to_string() == "disk on fire"));
        assert!(Arc::ptr_eq(&failures[0], outcome.error().unwrap()));
    }

    #[test]
    fn test_panic_is_contained() {
        let mut registry = CommandRegistry::new();
        registry
            .register(Command::new(
                "crash",
                HandlerRef::callable(|| async {
                    if true {
                        panic!("handler exploded");
                    }
                }),
            ))
            .unwrap();

        let recorder = Recorder::default();
        let d = dispatcher(registry, &recorder).emit_update_events(false);
        let outcome = tokio_test::block_on(d.dispatch(text_update("/crash"), bot()));

        assert!(matches!(
            outcome.error().map(|e| &**e),
            Some(CommandError::Panicked(msg)) if msg == "handler exploded"
        ));
        assert_eq!(recorder.names(), ["command.failed"]);

        // The dispatcher keeps working after a panic.
        let outcome = tokio_test::block_on(d.dispatch(text_update("/other"), bot()));
        assert!(matches!(outcome, DispatchOutcome::NotFound { .. }));
    }

    #[test]
    fn test_missing_argument_fails_without_running() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = CommandRegistry::new();
        registry
            .register(
                Command::new(
                    "convert",
                    HandlerRef::callable(move |_: Args| {
                        let counter = counter.clone();
                        async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                        }
                    }),
                )
                .try_args(["amount", "currency"])
                .unwrap(),
            )
            .unwrap();

        let recorder = Recorder::default();
        let outcome = tokio_test::block_on(
            dispatcher(registry, &recorder).dispatch(text_update("/convert 100"), bot()),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            outcome.error().map(|e| &**e),
            Some(CommandError::Binding(BindingError::MissingArgument { position: 1, .. }))
        ));
        assert_eq!(recorder.failures().len(), 1);
    }

    #[test]
    fn test_hook_runs_first_and_can_suppress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let mut registry = CommandRegistry::new();
        registry
            .register(
                Command::new(
                    "quiet",
                    HandlerRef::callable(|| async { Err::<(), _>("nope") }),
                )
                .on_failure(move |failure: &CommandFailure| {
                    log.lock().push(failure.error.to_string());
                    FailureDisposition::Suppress
                }),
            )
            .unwrap();

        let recorder = Recorder::default();
        let outcome = tokio_test::block_on(
            dispatcher(registry, &recorder)
                .emit_update_events(false)
                .dispatch(text_update("/quiet"), bot()),
        );

        assert!(outcome.is_failure());
        assert_eq!(seen.lock().as_slice(), ["handler failed: nope"]);
        assert!(recorder.names().is_empty());
    }

    #[test]
    fn test_only_first_command_runs() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = CommandRegistry::new();
        for name in ["a", "b"] {
            let calls = calls.clone();
            registry
                .register(Command::new(
                    name,
                    HandlerRef::callable(move || {
                        let calls = calls.clone();
                        async move { calls.lock().push(name) }
                    }),
                ))
                .unwrap();
        }

        let update = Update::from_value(json!({
            "update_id": 1,
            "message": {
                "text": "/a and /b",
                "entities": [
                    {"offset": 0, "length": 2, "type": "bot_command"},
                    {"offset": 7, "length": 2, "type": "bot_command"}
                ]
            }
        }))
        .unwrap();

        let recorder = Recorder::default();
        tokio_test::block_on(dispatcher(registry, &recorder).dispatch(update, bot()));
        assert_eq!(calls.lock().as_slice(), ["a"]);
    }

    #[test]
    fn test_not_addressed_and_malformed() {
        let recorder = Recorder::default();
        let d = dispatcher(CommandRegistry::new(), &recorder);

        let outcome = tokio_test::block_on(d.dispatch(text_update("/start@other_bot"), bot()));
        assert!(matches!(outcome, DispatchOutcome::NotAddressed { .. }));

        let malformed = Update::from_value(json!({"update_id": 1})).unwrap();
        let outcome = tokio_test::block_on(d.dispatch(malformed, bot()));
        assert!(matches!(outcome, DispatchOutcome::Malformed(MalformedUpdate::MissingContent)));

        assert!(!recorder.names().contains(&"command.not_found".to_owned()));
    }

    #[test]
    fn test_service_interface() {
        let mut registry = CommandRegistry::new();
        registry
            .register(Command::new("ping", HandlerRef::callable(|| async { "pong" })))
            .unwrap();

        let service = CommandDispatcher::new(registry).with_sink(crate::notification::NullSink);
        let outcome = tokio_test::block_on(
            service.oneshot(DispatchRequest::new(text_update("/ping"), bot())),
        )
        .unwrap();
        assert_eq!(outcome.output(), Some(&json!("pong")));
    }
}
