use std::any::Any;
use std::fmt;
use std::sync::Arc;

use herald::framework::{ChannelSink, RegistryError};
use herald::prelude::*;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug)]
struct QuotaExceeded;

impl fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("image quota exceeded")
    }
}

impl std::error::Error for QuotaExceeded {}

struct TelegramBot {
    token: String,
}

impl Bot for TelegramBot {
    fn name(&self) -> &str {
        "telegram"
    }

    fn username(&self) -> Option<&str> {
        Some("herald_bot")
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

fn parse_update(value: Value) -> Update {
    Update::from_value(value).unwrap()
}

fn text_update(text: &str) -> Update {
    parse_update(json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "chat": { "id": 42, "type": "private" },
            "text": text,
        },
    }))
}

fn bot() -> BoxedBot {
    Arc::new(TelegramBot {
        token: "secret".into(),
    })
}

fn dispatcher(registry: CommandRegistry) -> (CommandDispatcher, UnboundedReceiver<Notification>) {
    let (sink, rx) = ChannelSink::new();
    let dispatcher = CommandDispatcher::new(registry)
        .with_sink(sink)
        .emit_update_events(false);
    (dispatcher, rx)
}

fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        out.push(notification);
    }
    out
}

#[test]
fn test_aliases_resolve_to_the_same_command() {
    let mut registry = CommandRegistry::new();
    let registered = registry
        .register(
            Command::new("image", HandlerRef::callable(|| async {}))
                .with_aliases(["img", "picture"]),
        )
        .unwrap();

    for name in ["image", "img", "picture"] {
        assert!(Arc::ptr_eq(registry.resolve(name).unwrap(), &registered));
    }
}

#[test]
fn test_duplicate_registration_keeps_the_original() {
    let mut registry = CommandRegistry::new();
    let original = registry
        .register(Command::new("image", HandlerRef::callable(|| async {})).alias("img"))
        .unwrap();

    let err = registry
        .register(Command::new("img", HandlerRef::callable(|| async {})))
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::DuplicateCommand {
            name: "img".into(),
            existing: "image".into(),
        }
    );
    assert!(Arc::ptr_eq(registry.resolve("img").unwrap(), &original));
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn test_leading_marker_invokes_handler_once() {
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);

    let mut registry = CommandRegistry::new();
    registry
        .register(Command::new(
            "image",
            HandlerRef::callable(move || {
                let counter = Arc::clone(&counter);
                async move {
                    *counter.lock() += 1;
                }
            }),
        ))
        .unwrap();
    let (dispatcher, mut rx) = dispatcher(registry);

    let update = parse_update(json!({"update_id": 1, "message": {"text": "/image"}}));
    assert_eq!(update.update_type(), Some("message"));
    assert_eq!(update.payload_subtype(), Some("text"));

    let outcome = dispatcher.dispatch(update, bot()).await;
    assert!(outcome.is_success());
    assert_eq!(*calls.lock(), 1);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_entity_locates_command_mid_text() {
    let mut registry = CommandRegistry::new();
    registry
        .register(
            Command::new(
                "image",
                HandlerRef::callable(|invocation: herald::framework::Invocation| async move {
                    invocation.name
                }),
            )
            .alias("help"),
        )
        .unwrap();
    let (dispatcher, _rx) = dispatcher(registry);

    let update = parse_update(json!({
        "update_id": 7,
        "message": {
            "text": "Hey guys check out this /image ",
            "entities": [{ "offset": 24, "length": 6, "type": "bot_command" }],
        },
    }));
    let outcome = dispatcher.dispatch(update, bot()).await;
    assert_eq!(outcome.output(), Some(&json!("image")));

    // With entity metadata present, a leading marker alone is not a command.
    let update = parse_update(json!({
        "update_id": 8,
        "message": {
            "text": "/help me with @someone",
            "entities": [{ "offset": 14, "length": 8, "type": "mention" }],
        },
    }));
    let outcome = dispatcher.dispatch(update, bot()).await;
    assert!(matches!(outcome, DispatchOutcome::NoCommand));
}

#[tokio::test]
async fn test_missing_optional_arguments() {
    let seen: Arc<Mutex<Vec<(Option<String>, Option<String>)>>> = Arc::default();

    let record = |seen: Arc<Mutex<Vec<(Option<String>, Option<String>)>>>| {
        HandlerRef::callable(move |args: Args| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().push((
                    args.get("amount").map(str::to_owned),
                    args.get("currency").map(str::to_owned),
                ));
            }
        })
    };

    let mut registry = CommandRegistry::new();
    registry
        .register(
            Command::new("convert", record(Arc::clone(&seen)))
                .try_args(["amount", "currency=USD"])
                .unwrap(),
        )
        .unwrap();
    registry
        .register(
            Command::new("quote", record(Arc::clone(&seen)))
                .try_args(["amount", "currency?"])
                .unwrap(),
        )
        .unwrap();
    let (dispatcher, _rx) = dispatcher(registry);

    dispatcher.dispatch(text_update("/convert 100"), bot()).await;
    dispatcher.dispatch(text_update("/quote 100"), bot()).await;

    assert_eq!(
        *seen.lock(),
        [
            (Some("100".to_owned()), Some("USD".to_owned())),
            (Some("100".to_owned()), None),
        ]
    );
}

#[tokio::test]
async fn test_handler_error_is_reported_once() {
    let hook_calls = Arc::new(Mutex::new(Vec::new()));
    let hook_log = Arc::clone(&hook_calls);

    let mut registry = CommandRegistry::new();
    registry
        .register(
            Command::new(
                "image",
                HandlerRef::callable(|| async { Err::<(), _>(QuotaExceeded) }),
            )
            .on_failure(move |failure: &CommandFailure| {
                hook_log.lock().push(failure.command.name().to_owned());
                FailureDisposition::Notify
            }),
        )
        .unwrap();
    let (dispatcher, mut rx) = dispatcher(registry);

    let outcome = dispatcher.dispatch(text_update("/image"), bot()).await;
    let error = Arc::clone(outcome.error().unwrap());

    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    let Notification::CommandFailed {
        name,
        error: reported,
        update,
        ..
    } = &notifications[0]
    else {
        panic!("expected a failure notification, got {:?}", notifications[0]);
    };
    assert_eq!(name, "image");
    assert_eq!(update.id(), Some(1));
    assert!(Arc::ptr_eq(&error, reported));
    match &**reported {
        CommandError::Handler(source) => assert!(source.downcast_ref::<QuotaExceeded>().is_some()),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(*hook_calls.lock(), ["image"]);
}

#[tokio::test]
async fn test_panicking_handler_is_contained() {
    let mut registry = CommandRegistry::new();
    registry
        .register(Command::new(
            "boom",
            HandlerRef::callable(|| async {
                if true {
                    panic!("kaboom");
                }
            }),
        ))
        .unwrap();
    registry
        .register(Command::new("ping", HandlerRef::callable(|| async { "pong" })))
        .unwrap();
    let (dispatcher, mut rx) = dispatcher(registry);

    let outcome = dispatcher.dispatch(text_update("/boom"), bot()).await;
    assert!(matches!(
        outcome.error().map(|e| &**e),
        Some(CommandError::Panicked(message)) if message == "kaboom"
    ));
    assert_eq!(drain(&mut rx).len(), 1);

    let outcome = dispatcher.dispatch(text_update("/ping"), bot()).await;
    assert_eq!(outcome.output(), Some(&json!("pong")));
}

#[tokio::test]
async fn test_unknown_command_is_reported() {
    let (dispatcher, mut rx) = dispatcher(CommandRegistry::new());

    let outcome = dispatcher.dispatch(text_update("/doesnotexist"), bot()).await;
    assert!(matches!(outcome, DispatchOutcome::NotFound { ref name } if name == "doesnotexist"));

    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert!(matches!(
        &notifications[0],
        Notification::CommandNotFound { name, .. } if name == "doesnotexist"
    ));
}

#[tokio::test]
async fn test_contextual_extractors() {
    let mut registry = CommandRegistry::new();
    registry
        .register(Command::new(
            "whoami",
            HandlerRef::callable(|bot: BotRef<TelegramBot>, payload: Payload| async move {
                Json(json!({
                    "bot": bot.name(),
                    "token": bot.token.clone(),
                    "chat": payload.get("chat").get("id").as_i64(),
                }))
            }),
        ))
        .unwrap();
    let (dispatcher, _rx) = dispatcher(registry);

    let outcome = dispatcher
        .dispatch(text_update("/whoami@herald_bot"), bot())
        .await;
    assert_eq!(
        outcome.output(),
        Some(&json!({"bot": "telegram", "token": "secret", "chat": 42}))
    );

    // A bot of another type fails extraction before the handler runs.
    let outcome = dispatcher
        .dispatch(text_update("/whoami"), BotInfo::new("plain").boxed())
        .await;
    assert!(outcome.error().is_some_and(|e| e.is_binding()));
}

#[tokio::test]
async fn test_update_events() {
    let (sink, mut rx) = ChannelSink::new();
    let dispatcher = CommandDispatcher::new(CommandRegistry::new()).with_sink(sink);

    let outcome = dispatcher.dispatch(text_update("hello"), bot()).await;
    assert!(matches!(outcome, DispatchOutcome::NoCommand));

    let names: Vec<String> = drain(&mut rx)
        .iter()
        .map(|n| n.name().to_owned())
        .collect();
    assert_eq!(names, ["update", "message", "message.text"]);
}

#[test]
fn test_document_round_trip() {
    let raw = json!({
        "update_id": 3,
        "message": {
            "chat": { "id": 42, "title": "ops" },
            "photo": [{ "file_id": "a", "width": 90 }, { "file_id": "b", "width": 320 }],
        },
    });
    let original = ResponseDocument::try_from(raw).unwrap();
    let rewrapped = ResponseDocument::try_from(original.to_value()).unwrap();

    for doc in [&original, &rewrapped] {
        let message = doc.get("message");
        assert_eq!(message.get("chat").get("title").as_str(), Some("ops"));
        assert_eq!(message.get("photo").at(1).get("width").as_i64(), Some(320));
    }
    assert_eq!(original.to_value(), rewrapped.to_value());
}
