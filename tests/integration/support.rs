use envwrap::{
    envwrap, Arguments, EnvWrapped, Function, MapEnv, Param, Signature, Target, Value, ValueType,
};

pub type Triple = (Value, Value, Value);

/// `f(a: int = 1, b: str = "default", c: float = 3.14) -> (a, b, c)`
pub fn triple_signature() -> Signature {
    Signature::new([
        Param::new("a").default(1).annotated(ValueType::Int),
        Param::new("b").default("default").annotated(ValueType::Str),
        Param::new("c").default(3.14).annotated(ValueType::Float),
    ])
}

pub fn triple(args: Arguments) -> Triple {
    (args["a"].clone(), args["b"].clone(), args["c"].clone())
}

pub fn wrapped_triple(
    env: &MapEnv,
) -> EnvWrapped<impl Target<(), Output = Triple>> {
    envwrap("TEST_")
        .source(env.clone())
        .wrap(Function::new(triple_signature(), triple))
        .unwrap()
}

pub fn values(a: i64, b: &str, c: f64) -> Triple {
    (Value::Int(a), Value::Str(b.to_string()), Value::Float(c))
}

pub fn set_env_vars(env: &MapEnv, vars: &[(&str, &str)]) {
    for (key, value) in vars {
        env.set(*key, *value);
    }
}

pub fn clear_env_vars(env: &MapEnv, keys: &[&str]) {
    for key in keys {
        env.remove(key);
    }
}
