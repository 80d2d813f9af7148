use envwrap::{
    envwrap, Arguments, CallArgs, CallableKind, ClassMethod, Error, Function, MapEnv, Method,
    Param, Signature, StaticMethod, Value, ValueType,
};

use crate::support::{clear_env_vars, set_env_vars};

struct TestClass {
    label: &'static str,
}

fn pair(args: &Arguments, first: &str, second: &str) -> (Value, Value) {
    (args[first].clone(), args[second].clone())
}

fn receiver_signature(receiver: &str, first: &str, second: &str) -> Signature {
    Signature::new([
        Param::new(receiver),
        Param::new(first).default(1).annotated(ValueType::Int),
        Param::new(second).default("default").annotated(ValueType::Str),
    ])
}

#[test]
fn instance_method_overrides() {
    let env = MapEnv::new();
    let method = envwrap("TEST_")
        .source(env.clone())
        .wrap(Method::new(
            receiver_signature("self", "x", "y"),
            |_obj: &TestClass, args: Arguments| pair(&args, "x", "y"),
        ))
        .unwrap();
    assert_eq!(method.kind(), CallableKind::InstanceMethod);

    let obj = TestClass { label: "obj" };
    assert_eq!(
        method.call_method(&obj, CallArgs::new()).unwrap(),
        (Value::Int(1), Value::Str("default".into()))
    );

    set_env_vars(&env, &[("TEST_X", "99"), ("TEST_Y", "override")]);
    assert_eq!(
        method.call_method(&obj, CallArgs::new()).unwrap(),
        (Value::Int(99), Value::Str("override".into()))
    );

    // x still comes from the environment, y from the call site
    assert_eq!(
        method
            .call_method(&obj, CallArgs::new().kwarg("y", "call_override"))
            .unwrap(),
        (Value::Int(99), Value::Str("call_override".into()))
    );

    clear_env_vars(&env, &["TEST_X", "TEST_Y"]);
    assert_eq!(
        method
            .call_method(&obj, CallArgs::new().kwarg("y", "call_override"))
            .unwrap(),
        (Value::Int(1), Value::Str("call_override".into()))
    );
}

#[test]
fn method_receives_its_receiver() {
    let env = MapEnv::new();
    let method = envwrap("TEST_")
        .source(env)
        .wrap(Method::new(
            Signature::new([Param::new("self"), Param::new("suffix").default("!")]),
            |obj: &TestClass, args: Arguments| {
                format!("{}{}", obj.label, args["suffix"].as_str().unwrap_or_default())
            },
        ))
        .unwrap();
    let obj = TestClass { label: "hello" };
    assert_eq!(method.call_method(&obj, CallArgs::new()).unwrap(), "hello!");
}

#[test]
fn receiver_parameter_is_never_overridden() {
    let env = MapEnv::new().with("TEST_SELF", "intruder").with("TEST_X", "5");
    let method = envwrap("TEST_")
        .source(env)
        .wrap(Method::new(
            receiver_signature("self", "x", "y"),
            |_obj: &TestClass, args: Arguments| pair(&args, "x", "y"),
        ))
        .unwrap();
    assert_eq!(method.eligible(), ["x".to_string(), "y".to_string()]);

    let obj = TestClass { label: "obj" };
    assert_eq!(
        method.call_method(&obj, CallArgs::new()).unwrap(),
        (Value::Int(5), Value::Str("default".into()))
    );
}

#[test]
fn explicit_flag_overrides_name_heuristic() {
    let env = MapEnv::new().with("TEST_SELF", "intruder");
    let method = envwrap("TEST_")
        .is_method(Some(false))
        .source(env)
        .wrap(Method::new(
            receiver_signature("self", "x", "y"),
            |_obj: &TestClass, args: Arguments| pair(&args, "x", "y"),
        ))
        .unwrap();
    assert_eq!(method.kind(), CallableKind::Function);
    assert_eq!(method.eligible().len(), 3);

    let obj = TestClass { label: "obj" };
    assert!(matches!(
        method.call_method(&obj, CallArgs::new()),
        Err(Error::DuplicateArgument(name)) if name == "self"
    ));
}

#[test]
fn explicit_method_flag_skips_unconventional_receiver_name() {
    let env = MapEnv::new().with("TEST_THIS", "intruder").with("TEST_X", "8");
    let method = envwrap("TEST_")
        .is_method(Some(true))
        .source(env)
        .wrap(Method::new(
            receiver_signature("this", "x", "y"),
            |_obj: &TestClass, args: Arguments| pair(&args, "x", "y"),
        ))
        .unwrap();
    assert_eq!(method.kind(), CallableKind::InstanceMethod);

    let obj = TestClass { label: "obj" };
    assert_eq!(
        method.call_method(&obj, CallArgs::new()).unwrap(),
        (Value::Int(8), Value::Str("default".into()))
    );
}

#[test]
fn class_method_overrides() {
    let env = MapEnv::new();
    let method = envwrap("TEST_")
        .source(env.clone())
        .wrap(ClassMethod(Method::new(
            receiver_signature("cls", "p", "q"),
            |_cls: &TestClass, args: Arguments| pair(&args, "p", "q"),
        )))
        .unwrap();
    assert_eq!(method.kind(), CallableKind::ClassMethod);

    let cls = TestClass { label: "TestClass" };
    assert_eq!(
        method.call_method(&cls, CallArgs::new()).unwrap(),
        (Value::Int(1), Value::Str("default".into()))
    );

    set_env_vars(&env, &[("TEST_P", "88"), ("TEST_Q", "class_override")]);
    assert_eq!(
        method.call_method(&cls, CallArgs::new()).unwrap(),
        (Value::Int(88), Value::Str("class_override".into()))
    );
}

#[test]
fn static_method_overrides() {
    let env = MapEnv::new();
    let method = envwrap("TEST_")
        .source(env.clone())
        .wrap(StaticMethod(Function::new(
            Signature::new([
                Param::new("m").default(1).annotated(ValueType::Int),
                Param::new("n").default("default").annotated(ValueType::Str),
            ]),
            |args: Arguments| pair(&args, "m", "n"),
        )))
        .unwrap();
    assert_eq!(method.kind(), CallableKind::StaticMethod);

    assert_eq!(
        method.call(CallArgs::new()).unwrap(),
        (Value::Int(1), Value::Str("default".into()))
    );

    set_env_vars(&env, &[("TEST_M", "77"), ("TEST_N", "static_override")]);
    assert_eq!(
        method.call(CallArgs::new()).unwrap(),
        (Value::Int(77), Value::Str("static_override".into()))
    );
}
