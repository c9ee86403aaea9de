use std::sync::Arc;

use prism_config::relay::RelayConfig;
use serde_json::{Value, json};
use serial_test::serial;

use crate::memory::{MemoryTarget, RecordingPrompt, StaticFetcher, StaticRenderer};
use crate::{
    BlockArgs, DenoEvaluator, Dispatcher, Evaluator, ExecutionContext, HeadlessAudio, PrismError,
    PrismExtension, PrismServices, ScrollAccumulator,
};

#[test]
#[serial]
fn test_deno_evaluator_values() {
    let evaluator = DenoEvaluator::new();

    assert_eq!(evaluator.evaluate("1 + 2").unwrap(), json!(3));
    assert_eq!(evaluator.evaluate("'a' + 'b'").unwrap(), json!("ab"));
    assert_eq!(evaluator.evaluate("({ a: [1, true] })").unwrap(), json!({ "a": [1, true] }));
    assert_eq!(evaluator.evaluate("undefined").unwrap(), Value::Null);
}

#[test]
#[serial]
fn test_deno_evaluator_keeps_globals() {
    let evaluator = DenoEvaluator::new();

    evaluator.evaluate("globalThis.counter = 41").unwrap();
    assert_eq!(evaluator.evaluate("counter + 1").unwrap(), json!(42));
}

#[test]
#[serial]
fn test_deno_evaluator_reports_errors() {
    let evaluator = DenoEvaluator::new();

    let err = evaluator.evaluate("throw new Error('kaboom')").unwrap_err();
    assert!(matches!(&err, PrismError::Evaluation(e) if e.contains("kaboom")), "{err}");

    let err = evaluator.execute("this is not javascript").unwrap_err();
    assert!(matches!(err, PrismError::Evaluation(ref e) if !e.is_empty()));

    // a failed evaluation leaves the isolate usable
    assert_eq!(evaluator.evaluate("2 * 21").unwrap(), json!(42));
}

#[test]
#[serial]
fn test_deno_evaluator_describes_values_without_json_form() {
    let evaluator = DenoEvaluator::new();

    let function = evaluator.evaluate("(function add(a, b) { return a + b; })").unwrap();
    assert!(function.as_str().is_some_and(|f| f.contains("return a + b")), "{function}");

    assert_eq!(evaluator.evaluate("Symbol('x')").unwrap(), json!("Symbol(x)"));
    assert_eq!(evaluator.evaluate("10n ** 2n").unwrap(), json!("100"));
    assert_eq!(
        evaluator.evaluate("var loop = {}; loop.self = loop; loop").unwrap(),
        json!("[object Object]")
    );

    // the cyclic value stays reachable and the isolate keeps working
    assert_eq!(evaluator.evaluate("loop.self === loop").unwrap(), json!(true));
}

#[test]
#[serial]
fn test_deno_evaluator_execute_skips_the_completion_value() {
    let evaluator = DenoEvaluator::new();

    evaluator.execute("Symbol('x')").unwrap();
    evaluator.execute("var loop = {}; loop.self = loop; loop").unwrap();
    evaluator.execute("function twice(n) { return n * 2; }").unwrap();
    assert_eq!(evaluator.evaluate("twice(21)").unwrap(), json!(42));
}

#[tokio::test]
#[serial]
async fn test_evaluation_blocks_on_v8() {
    let prompt = Arc::new(RecordingPrompt::new(true));
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register(Box::new(PrismExtension::new(PrismServices {
            audio: Arc::new(HeadlessAudio::new()),
            evaluator: Box::new(DenoEvaluator::new()),
            prompt: prompt.clone(),
            fetcher: Arc::new(StaticFetcher::new()),
            renderer: Arc::new(StaticRenderer::default()),
            relay: RelayConfig::default(),
            scroll: ScrollAccumulator::new(),
        })))
        .unwrap();
    let ctx = ExecutionContext::new(Arc::new(MemoryTarget::new("sprite1")));
    let js = |source: &str| BlockArgs::new().with("JAVASCRIPT", source);

    let result = dispatcher.invoke("evaluate", &js("var seen = 'yes'"), &ctx).await.unwrap();
    assert_eq!(result, Value::Null);
    assert_eq!(dispatcher.invoke("evaluate2", &js("seen"), &ctx).await.unwrap(), json!("yes"));

    assert_eq!(
        dispatcher
            .invoke("evaluate2", &js("JSON.stringify({ a: 1 })"), &ctx)
            .await
            .unwrap(),
        json!({ "a": 1 })
    );
    assert_eq!(
        dispatcher.invoke("evaluate3", &js("'1'"), &ctx).await.unwrap(),
        json!(true)
    );
    assert_eq!(
        dispatcher.invoke("evaluate3", &js("null.x"), &ctx).await.unwrap(),
        json!(false)
    );

    // values without a JSON form are not failures
    let result = dispatcher.invoke("evaluate", &js("Symbol('x')"), &ctx).await.unwrap();
    assert_eq!(result, Value::Null);
    dispatcher
        .invoke("evaluate", &js("var loop = {}; loop.self = loop; loop"), &ctx)
        .await
        .unwrap();
    assert_eq!(
        dispatcher.invoke("evaluate2", &js("Symbol('x')"), &ctx).await.unwrap(),
        json!("Symbol(x)")
    );
    assert_eq!(
        dispatcher.invoke("evaluate2", &js("loop"), &ctx).await.unwrap(),
        json!("[object Object]")
    );
    assert!(prompt.alerts().is_empty(), "{:?}", prompt.alerts());

    dispatcher.invoke("evaluate", &js("missing()"), &ctx).await.unwrap();
    let alerts = prompt.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("missing"), "{alerts:?}");
}
