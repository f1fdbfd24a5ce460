use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::context::CommandContext;
use crate::error::CommandError;
use crate::handler::{Handler, MethodHandler};

/// What a handler invocation produces.
pub type HandlerResult = Result<Option<Value>, CommandError>;

/// A type-erased handler that can be stored in a registry.
///
/// Internally a closure that captures the original handler and calls it
/// with a cloned copy on each invocation.
pub type BoxedHandler =
    Arc<dyn Fn(Arc<CommandContext>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Convert a handler function into a boxed handler.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(move |ctx| f.clone().call(ctx))
}

/// Describes which kind of target a [`HandlerRef`] invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerKind {
    /// A free function or closure.
    Callable { name: String },
    /// A method on a receiver shared across invocations.
    Method { type_name: &'static str, method: String },
    /// A method on a receiver constructed for each invocation.
    Constructed { type_name: &'static str, method: String },
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable { name } => f.write_str(name),
            Self::Method { type_name, method } => write!(f, "{type_name}::{method}"),
            Self::Constructed { type_name, method } => {
                write!(f, "{type_name}::{method} (constructed)")
            }
        }
    }
}

/// A reference to the code that runs a command.
///
/// All variants share one invocation capability, so the dispatcher never
/// inspects which kind it holds.
#[derive(Clone)]
pub struct HandlerRef {
    kind: HandlerKind,
    call: BoxedHandler,
}

impl HandlerRef {
    /// References a free function or closure.
    pub fn callable<F, T>(f: F) -> Self
    where
        F: Handler<T>,
        T: 'static,
    {
        Self::named(std::any::type_name::<F>(), f)
    }

    /// Like [`callable`](Self::callable), with an explicit name for logs.
    pub fn named<F, T>(name: impl Into<String>, f: F) -> Self
    where
        F: Handler<T>,
        T: 'static,
    {
        Self {
            kind: HandlerKind::Callable { name: name.into() },
            call: into_handler(f),
        }
    }

    /// References a method on a shared receiver.
    pub fn method<S, F, T>(receiver: Arc<S>, method: impl Into<String>, f: F) -> Self
    where
        S: Send + Sync + 'static,
        F: MethodHandler<S, T>,
        T: 'static,
    {
        Self {
            kind: HandlerKind::Method {
                type_name: std::any::type_name::<S>(),
                method: method.into(),
            },
            call: Arc::new(move |ctx| f.clone().call(receiver.clone(), ctx)),
        }
    }

    /// References a method on a receiver built with `S::default()` for every
    /// invocation.
    pub fn constructed<S, F, T>(method: impl Into<String>, f: F) -> Self
    where
        S: Default + Send + Sync + 'static,
        F: MethodHandler<S, T>,
        T: 'static,
    {
        Self {
            kind: HandlerKind::Constructed {
                type_name: std::any::type_name::<S>(),
                method: method.into(),
            },
            call: Arc::new(move |ctx| {
                let f = f.clone();
                Box::pin(async move { f.call(Arc::new(S::default()), ctx).await })
            }),
        }
    }

    pub fn kind(&self) -> &HandlerKind {
        &self.kind
    }

    /// Starts an invocation. Nothing runs until the future is polled.
    pub fn invoke(&self, ctx: Arc<CommandContext>) -> BoxFuture<'static, HandlerResult> {
        (self.call)(ctx)
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerRef").field(&self.kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use herald_core::Update;

    use super::*;
    use crate::binder::BoundArguments;
    use crate::bot::BotInfo;
    use crate::command::{ArgumentSpec, Command};
    use crate::extractor::Args;
    use crate::parse::{Invocation, TextSource};

    fn context(handler: HandlerRef, args: &[(&str, &str)]) -> Arc<CommandContext> {
        let invocation = Invocation {
            name: "t".into(),
            mention: None,
            arguments: args.iter().map(|(_, v)| (*v).to_owned()).collect(),
            remainder: String::new(),
            source: TextSource::Text,
        };
        let specs: Vec<ArgumentSpec> = args.iter().map(|(n, _)| n.parse().unwrap()).collect();
        let arguments: BoundArguments = crate::binder::bind(&specs, &invocation).unwrap();
        Arc::new(CommandContext::new(
            Update::default(),
            BotInfo::new("test").boxed(),
            Arc::new(Command::new("t", handler)),
            invocation,
            arguments,
        ))
    }

    fn run(handler: HandlerRef, args: &[(&str, &str)]) -> HandlerResult {
        let ctx = context(handler.clone(), args);
        tokio_test::block_on(handler.invoke(ctx))
    }

    #[test]
    fn test_callable() {
        async fn greet(args: Args) -> String {
            format!("hello {}", args.get("name").unwrap_or("nobody"))
        }

        let handler = HandlerRef::callable(greet);
        assert!(matches!(handler.kind(), HandlerKind::Callable { name } if name.ends_with("greet")));
        let out = run(handler, &[("name", "ada")]).unwrap();
        assert_eq!(out, Some(Value::from("hello ada")));
    }

    struct Counter {
        hits: AtomicUsize,
    }

    impl Default for Counter {
        fn default() -> Self {
            Self {
                hits: AtomicUsize::new(0),
            }
        }
    }

    impl Counter {
        async fn hit(self: Arc<Self>) -> String {
            let n = self.hits.fetch_add(1, Ordering::SeqCst) + 1;
            n.to_string()
        }
    }

    #[test]
    fn test_method_shares_receiver() {
        let counter = Arc::new(Counter::default());
        let handler = HandlerRef::method(counter.clone(), "hit", Counter::hit);
        assert_eq!(handler.kind().to_string(), format!("{}::hit", std::any::type_name::<Counter>()));

        run(handler.clone(), &[]).unwrap();
        let out = run(handler, &[]).unwrap();
        assert_eq!(out, Some(Value::from("2")));
        assert_eq!(counter.hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_constructed_gets_fresh_receiver() {
        let handler = HandlerRef::constructed::<Counter, _, _>("hit", Counter::hit);
        run(handler.clone(), &[]).unwrap();
        let out = run(handler, &[]).unwrap();
        assert_eq!(out, Some(Value::from("1")));
    }

    #[test]
    fn test_extraction_failure_is_binding_error() {
        #[derive(serde::Deserialize)]
        struct Num {
            #[allow(dead_code)]
            n: u8,
        }

        let handler = HandlerRef::callable(|_: crate::extractor::Arguments<Num>| async {});
        let err = run(handler, &[("n", "300")]).unwrap_err();
        assert!(err.is_binding());
    }
}
