//! Tests against the real process environment. Variables are process-global,
//! so every test holds `ENV_LOCK` and uses its own prefix.

use envwrap::{envwrap, Arguments, CallArgs, Function, Param, Signature, Value, ValueType};
use parking_lot::Mutex;
use std::env;

static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

struct ScopedVars(Vec<&'static str>);

impl ScopedVars {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for (key, value) in vars {
            env::set_var(key, value);
        }
        Self(vars.iter().map(|(k, _)| *k).collect())
    }
}

impl Drop for ScopedVars {
    fn drop(&mut self) {
        for key in &self.0 {
            env::remove_var(key);
        }
    }
}

fn greeting() -> Function<impl Fn(Arguments) -> (Value, Value)> {
    Function::new(
        Signature::new([
            Param::new("greeting").default("hello"),
            Param::new("times").default(1).annotated(ValueType::Int),
        ]),
        |args: Arguments| (args["greeting"].clone(), args["times"].clone()),
    )
}

#[test]
fn process_environment_is_the_default_source() {
    let _guard = ENV_LOCK.lock();
    let f = envwrap("ENVWRAP_IT_DEFAULT_").wrap(greeting()).unwrap();
    assert_eq!(
        f.call(CallArgs::new()).unwrap(),
        (Value::Str("hello".into()), Value::Int(1))
    );

    let _vars = ScopedVars::set(&[
        ("ENVWRAP_IT_DEFAULT_GREETING", "hi"),
        ("ENVWRAP_IT_DEFAULT_TIMES", "3"),
    ]);
    assert_eq!(
        f.call(CallArgs::new()).unwrap(),
        (Value::Str("hi".into()), Value::Int(3))
    );
}

#[test]
fn process_environment_changes_are_seen_per_call() {
    let _guard = ENV_LOCK.lock();
    let f = envwrap("ENVWRAP_IT_LIVE_").wrap(greeting()).unwrap();
    {
        let _vars = ScopedVars::set(&[("ENVWRAP_IT_LIVE_TIMES", "2")]);
        assert_eq!(f.call(CallArgs::new()).unwrap().1, Value::Int(2));
    }
    assert_eq!(f.call(CallArgs::new()).unwrap().1, Value::Int(1));
}

#[test]
fn process_environment_suffix_is_case_insensitive() {
    let _guard = ENV_LOCK.lock();
    let f = envwrap("ENVWRAP_IT_CASE_").wrap(greeting()).unwrap();
    let _vars = ScopedVars::set(&[("ENVWRAP_IT_CASE_Greeting", "hey")]);
    assert_eq!(
        f.call(CallArgs::new().kwarg("times", 4)).unwrap(),
        (Value::Str("hey".into()), Value::Int(4))
    );
}
