use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use herald::framework::{CommandError, HandlerKind};
use herald::prelude::*;
use serde::Deserialize;
use serde_json::json;

#[derive(Default)]
struct Counter {
    hits: AtomicUsize,
}

#[derive(Debug, Deserialize)]
struct Add {
    a: i64,
    b: i64,
}

#[command_handlers]
impl Counter {
    /// Count one hit
    #[command(aliases = ["inc"])]
    async fn hit(&self) -> String {
        let hits = self.hits.fetch_add(1, Ordering::SeqCst) + 1;
        hits.to_string()
    }

    #[command(name = "sum", description = "Add two numbers", args = ["a", "b=0"])]
    fn add(Arguments(add): Arguments<Add>) -> Json<i64> {
        Json(add.a + add.b)
    }

    #[command(alias = "t")]
    async fn total(self: Arc<Self>, excess: Excess) -> Result<String, BoxError> {
        if !excess.0.is_empty() {
            return Err(format!("unexpected arguments: {}", excess.0.join(" ")).into());
        }
        Ok(self.hits.load(Ordering::SeqCst).to_string())
    }

    /// Not registered.
    fn helper(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn message(text: &str) -> Update {
    Update::from_value(json!({
        "update_id": 1,
        "message": { "message_id": 1, "text": text },
    }))
    .unwrap()
}

fn dispatcher(counter: &Arc<Counter>) -> CommandDispatcher {
    let mut registry = CommandRegistry::new();
    registry.register_provider(Arc::clone(counter)).unwrap();
    CommandDispatcher::new(registry).emit_update_events(false)
}

async fn run(dispatcher: &CommandDispatcher, text: &str) -> DispatchOutcome {
    dispatcher
        .dispatch(message(text), BotInfo::new("test").boxed())
        .await
}

#[test]
fn test_provider_metadata() {
    let commands = Arc::new(Counter::default()).commands().unwrap();
    let names: Vec<&str> = commands.iter().map(Command::name).collect();
    assert_eq!(names, ["hit", "sum", "total"]);

    let hit = &commands[0];
    assert_eq!(hit.description(), "Count one hit");
    assert_eq!(hit.aliases(), ["inc"]);
    assert!(matches!(
        hit.handler().kind(),
        HandlerKind::Method { method, .. } if method == "hit"
    ));

    let sum = &commands[1];
    assert_eq!(sum.description(), "Add two numbers");
    assert_eq!(sum.usage('/'), "/sum <a> [b=0]");
    assert!(matches!(
        sum.handler().kind(),
        HandlerKind::Callable { name } if name.ends_with("Counter::add")
    ));

    assert_eq!(commands[2].aliases(), ["t"]);
    assert_eq!(commands[2].description(), "");
}

#[tokio::test]
async fn test_ref_methods_share_the_instance() {
    let counter = Arc::new(Counter::default());
    let dispatcher = dispatcher(&counter);

    assert_eq!(run(&dispatcher, "/hit").await.output(), Some(&json!("1")));
    assert_eq!(run(&dispatcher, "/inc").await.output(), Some(&json!("2")));
    assert_eq!(run(&dispatcher, "/t").await.output(), Some(&json!("2")));
    assert_eq!(counter.helper(), 2);
}

#[tokio::test]
async fn test_declared_arguments() {
    let dispatcher = dispatcher(&Arc::new(Counter::default()));

    assert_eq!(run(&dispatcher, "/sum 2 40").await.output(), Some(&json!(42)));
    assert_eq!(run(&dispatcher, "/sum 7").await.output(), Some(&json!(7)));

    let outcome = run(&dispatcher, "/sum seven").await;
    let error = outcome.error().unwrap();
    assert!(error.is_binding());

    let outcome = run(&dispatcher, "/sum").await;
    assert!(matches!(
        outcome.error().map(|e| &**e),
        Some(CommandError::Binding(_))
    ));
}

#[tokio::test]
async fn test_method_errors_are_failures() {
    let dispatcher = dispatcher(&Arc::new(Counter::default()));

    let outcome = run(&dispatcher, "/total now").await;
    assert!(outcome.is_failure());
    assert!(
        outcome
            .error()
            .unwrap()
            .to_string()
            .contains("unexpected arguments: now")
    );
}
