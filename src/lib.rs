//! Envwrap: Override Callable Defaults with Environment Variables
//!
//! Wraps a callable described by an explicit [`Signature`] so that variables
//! named `PREFIX` + `PARAM` replace its declared defaults at call time, while
//! call-site arguments still win.
//!
//! ```
//! use envwrap::{envwrap, Arguments, CallArgs, Function, MapEnv, Param, Signature, Value, ValueType};
//!
//! let env = MapEnv::new().with("FOO_A", "42");
//! let test = envwrap("FOO_")
//!     .source(env)
//!     .wrap(Function::new(
//!         Signature::new([
//!             Param::new("a").default(1).annotated(ValueType::Int),
//!             Param::new("c").default(3),
//!         ]),
//!         |args: Arguments| (args["a"].clone(), args["c"].clone()),
//!     ))
//!     .unwrap();
//!
//! let (a, c) = test.call(CallArgs::new().kwarg("c", 99)).unwrap();
//! assert_eq!(a, Value::Int(42));
//! assert_eq!(c, Value::Int(99));
//! ```

pub mod args;
pub mod convert;
pub mod env;
pub mod error;
pub mod logging;
pub mod settings;
pub mod signature;
pub mod target;
pub mod tooling;
pub mod value;
pub mod wrap;

pub use args::{Arguments, CallArgs};
pub use convert::{Annotation, Converter, TypeMap};
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use error::{ConversionError, Error};
pub use signature::{classify, CallableKind, Param, Signature};
pub use target::{root_callable, ClassMethod, Function, Inspect, Method, StaticMethod, Target};
pub use value::{Value, ValueType};
pub use wrap::{envwrap, EnvWrap, EnvWrapped, Origin, Resolution};
