use std::collections::HashMap;

use serde::Deserialize;
use ulid::Ulid;

use binder_core::binding::{HttpRequest, TargetType};
use binder_core::broker::{DispatchError, FunctionMethod, ParameterSpec};
use binder_core::domain::{HttpPayload, ParameterPayload, WireData};
use binder_core::invoke::{BoxedValue, HandlerError, MethodHandle, NoInstance};

#[derive(Debug, Deserialize)]
struct GreetPayload {
    name: String,
    #[serde(default)]
    shout: bool,
}

/// handler: greet(payload: GreetPayload) -> String
fn greet_method() -> FunctionMethod {
    let handle = MethodHandle::of_static(|mut args| {
        let p = *args
            .pop()
            .ok_or("missing payload argument")?
            .downcast::<GreetPayload>()
            .map_err(|_| "payload is not a GreetPayload")?;

        let mut message = format!("Hello, {}!", p.name);
        if p.shout {
            message = message.to_uppercase();
        }
        Ok(Box::new(message) as BoxedValue)
    });

    FunctionMethod {
        handle,
        params: vec![ParameterSpec::named("payload", TargetType::of::<GreetPayload>())],
    }
}

/// handler: http_echo(req: HttpRequest, trace: String) -> String
fn http_echo_method() -> FunctionMethod {
    let handle = MethodHandle::of_static(|mut args| {
        let trace = *args
            .pop()
            .ok_or("missing trace argument")?
            .downcast::<String>()
            .map_err(|_| "trace is not a String")?;
        let req = *args
            .pop()
            .ok_or("missing request argument")?
            .downcast::<HttpRequest>()
            .map_err(|_| "req is not an HttpRequest")?;

        Ok(Box::new(format!(
            "{} {} body={:?} trace={}",
            req.method, req.uri, req.body, trace
        )) as BoxedValue)
    });

    FunctionMethod {
        handle,
        params: vec![
            ParameterSpec::named("req", TargetType::of::<HttpRequest>()),
            ParameterSpec::named("X-Trace", TargetType::of::<String>()),
        ],
    }
}

/// transport 役: 復号済み payload を invocation ごとに手組みして流す
fn run_invocation(function: &str, method: &FunctionMethod, payloads: Vec<ParameterPayload>) {
    let invocation_id = Ulid::new();
    println!("--- invocation {invocation_id} function={function}");

    match method.dispatch(payloads, &NoInstance) {
        Ok(result) => match result.downcast::<String>() {
            Ok(s) => println!("    ok: {s}"),
            Err(_) => println!("    ok: (non-string return)"),
        },
        Err(DispatchError::Bind(e)) => println!("    bind error: {e}"),
        Err(err) => match err.into_handler_error() {
            Ok(handler_err) => println!("    handler error: {handler_err}"),
            Err(other) => println!("    error: {other}"),
        },
    }
}

fn main() {
    let greet = greet_method();
    let http_echo = http_echo_method();

    // 1. JSON payload -> 型付き struct
    run_invocation(
        "greet",
        &greet,
        vec![ParameterPayload::named(
            "payload",
            WireData::Json(serde_json::json!({"name": "ada", "shout": true}).to_string()),
        )],
    );

    // 2. composite request -> HttpRequest + header 子要素
    let request = HttpPayload {
        method: "POST".to_string(),
        url: "http://localhost:7071/api/echo".to_string(),
        headers: HashMap::from([("X-Trace".to_string(), Ulid::new().to_string())]),
        query: HashMap::from([("verbose".to_string(), "1".to_string())]),
        params: HashMap::new(),
        body: Some(Box::new(WireData::Text("ping".to_string()))),
    };
    run_invocation(
        "http_echo",
        &http_echo,
        vec![ParameterPayload::named("req", WireData::Http(request))],
    );

    // 3. 未知の wire kind は分類で即 abort
    run_invocation(
        "greet",
        &greet,
        vec![ParameterPayload::named(
            "payload",
            WireData::Unknown {
                kind: "collection_sint64".to_string(),
            },
        )],
    );

    // 4. handler 自身のエラーはそのまま報告される
    let failing = FunctionMethod {
        handle: MethodHandle::of_static(|_| {
            Err(HandlerError::from("backend unavailable"))
        }),
        params: vec![],
    };
    run_invocation("flaky", &failing, vec![]);
}
