use envwrap::{
    envwrap, root_callable, Arguments, CallArgs, CallableKind, Function, Inspect, MapEnv, Method,
    Param, Signature, Value, ValueType,
};

fn pair_signature() -> Signature {
    Signature::new([
        Param::new("a").default(1).annotated(ValueType::Int),
        Param::new("b").default(2).annotated(ValueType::Int),
    ])
}

fn pair(args: Arguments) -> (Value, Value) {
    (args["a"].clone(), args["b"].clone())
}

#[test]
fn outer_prefix_overrides_reach_the_inner_callable() {
    let env = MapEnv::new();
    let inner = envwrap("INNER_")
        .source(env.clone())
        .wrap(Function::new(pair_signature(), pair))
        .unwrap();
    let outer = envwrap("OUTER_").source(env.clone()).wrap(inner).unwrap();

    assert_eq!(
        outer.call(CallArgs::new()).unwrap(),
        (Value::Int(1), Value::Int(2))
    );

    env.set("OUTER_A", "10");
    env.set("INNER_A", "20");
    assert_eq!(
        outer.call(CallArgs::new()).unwrap(),
        (Value::Int(10), Value::Int(2))
    );
    assert_eq!(
        outer.call(CallArgs::new().kwarg("a", 30)).unwrap(),
        (Value::Int(30), Value::Int(2))
    );
}

#[test]
fn outer_defaults_shadow_inner_environment() {
    let env = MapEnv::new().with("INNER_B", "7");
    let inner = envwrap("INNER_")
        .source(env.clone())
        .wrap(Function::new(pair_signature(), pair))
        .unwrap();
    assert_eq!(
        inner.call(CallArgs::new()).unwrap(),
        (Value::Int(1), Value::Int(7))
    );

    // the outer layer passes every declared default on as a call-site keyword
    let outer = envwrap("OUTER_").source(env).wrap(inner).unwrap();
    assert_eq!(
        outer.call(CallArgs::new()).unwrap(),
        (Value::Int(1), Value::Int(2))
    );
}

#[test]
fn inner_environment_fills_parameters_without_defaults() {
    let env = MapEnv::new().with("INNER_NAME", "inner");
    let inner = envwrap("INNER_")
        .source(env.clone())
        .wrap(Function::new(
            Signature::new([Param::new("name"), Param::new("count").default(1)]),
            |args: Arguments| (args["name"].clone(), args["count"].clone()),
        ))
        .unwrap();
    let outer = envwrap("OUTER_").source(env.clone()).wrap(inner).unwrap();

    assert_eq!(
        outer.call(CallArgs::new()).unwrap(),
        (Value::Str("inner".into()), Value::Int(1))
    );

    env.set("OUTER_NAME", "outer");
    assert_eq!(
        outer.call(CallArgs::new()).unwrap(),
        (Value::Str("outer".into()), Value::Int(1))
    );
}

#[test]
fn method_kind_is_detected_through_wrapper_layers() {
    struct Counter {
        base: i64,
    }

    let env = MapEnv::new().with("OUTER_SELF", "ignored").with("OUTER_STEP", "5");
    let inner = envwrap("INNER_")
        .source(env.clone())
        .wrap(Method::new(
            Signature::new([Param::new("self"), Param::new("step").default(1)]),
            |counter: &Counter, args: Arguments| {
                counter.base + args["step"].as_int().unwrap_or_default()
            },
        ))
        .unwrap();
    let outer = envwrap("OUTER_").source(env).wrap(inner).unwrap();

    assert_eq!(outer.kind(), CallableKind::InstanceMethod);
    assert_eq!(outer.eligible(), ["step".to_string()]);
    assert_eq!(
        outer
            .call_method(&Counter { base: 100 }, CallArgs::new())
            .unwrap(),
        105
    );
}

#[test]
fn root_callable_reaches_the_innermost_target() {
    let env = MapEnv::new();
    let inner = envwrap("INNER_")
        .source(env.clone())
        .wrap(Function::new(pair_signature(), pair))
        .unwrap();
    let outer = envwrap("OUTER_").source(env).wrap(inner).unwrap();

    let root = root_callable(&outer);
    assert!(root.underlying().is_none());
    assert_eq!(root.signature().names().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(outer.target().prefix(), "INNER_");
    assert_eq!(outer.prefix(), "OUTER_");
}
