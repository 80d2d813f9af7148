//! Environment Override Wrapper
//!
//! Wraps a callable so that environment variables sharing a prefix override its
//! parameter defaults at call time.
//!
//! Precedence, highest first:
//!
//! - call site (`f(a=3)`)
//! - environment (`FOO_A=2`)
//! - declared default (`a=1`)
//!
//! Everything that depends only on the callable (its signature, its kind and the
//! eligible parameter names) is computed once in [`EnvWrap::wrap`]. The
//! environment is scanned afresh on every call so changes are seen immediately.

use crate::args::CallArgs;
use crate::convert::TypeMap;
use crate::env::{scan_prefixed, EnvSource, ProcessEnv};
use crate::error::Error;
use crate::signature::{classify, CallableKind, Param, Signature};
use crate::target::{root_callable, Inspect, Target};
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Start configuring a wrapper for variables named `prefix` + `PARAM_NAME`.
pub fn envwrap(prefix: impl Into<String>) -> EnvWrap {
    EnvWrap::new(prefix)
}

/// Wrapping constructor: prefix, fallback types, method flag and variable source.
#[derive(Clone)]
pub struct EnvWrap {
    prefix: String,
    types: TypeMap,
    is_method: Option<bool>,
    source: Arc<dyn EnvSource>,
}

impl EnvWrap {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            types: TypeMap::new(),
            is_method: None,
            source: Arc::new(ProcessEnv),
        }
    }

    /// Last-resort converters for parameters with neither annotation nor a
    /// non-`None` default.
    pub fn types(mut self, types: TypeMap) -> Self {
        self.types = types;
        self
    }

    /// `Some(true)` treats the first parameter as a receiver, `Some(false)` never
    /// does, `None` guesses from its name.
    pub fn is_method(mut self, is_method: Option<bool>) -> Self {
        self.is_method = is_method;
        self
    }

    /// Read variables from `source` instead of the process environment.
    pub fn source(mut self, source: impl EnvSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Inspect `target` once and return the wrapped callable.
    pub fn wrap<T: Inspect>(self, target: T) -> Result<EnvWrapped<T>, Error> {
        let signature = target.signature().clone();
        signature.validate()?;

        let kind = resolve_kind(&target, self.is_method);
        let eligible: Vec<String> = signature
            .names()
            .skip(usize::from(kind.has_receiver()))
            .map(str::to_string)
            .collect();

        debug!(
            prefix = %self.prefix,
            kind = ?kind,
            eligible = ?eligible,
            "wrapped callable for environment overrides"
        );

        Ok(EnvWrapped {
            plan: Arc::new(WrapPlan {
                prefix: self.prefix,
                signature,
                kind,
                eligible,
                types: self.types,
                source: self.source,
            }),
            target,
        })
    }
}

impl std::fmt::Debug for EnvWrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvWrap")
            .field("prefix", &self.prefix)
            .field("types", &self.types)
            .field("is_method", &self.is_method)
            .finish_non_exhaustive()
    }
}

/// Decide the callable kind from the explicit flag, the outermost descriptor and
/// the root callable's first parameter name.
fn resolve_kind(target: &dyn Inspect, is_method: Option<bool>) -> CallableKind {
    let guessed = classify(root_callable(target).signature());
    let has_receiver = is_method.unwrap_or_else(|| guessed.has_receiver());

    match (has_receiver, target.descriptor()) {
        (true, Some(CallableKind::ClassMethod)) => CallableKind::ClassMethod,
        (true, _) if guessed == CallableKind::ClassMethod => CallableKind::ClassMethod,
        (true, _) => CallableKind::InstanceMethod,
        (false, Some(CallableKind::StaticMethod)) => CallableKind::StaticMethod,
        (false, _) => CallableKind::Function,
    }
}

struct WrapPlan {
    prefix: String,
    signature: Signature,
    kind: CallableKind,
    eligible: Vec<String>,
    types: TypeMap,
    source: Arc<dyn EnvSource>,
}

/// Where a resolved keyword value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Default,
    Environment { variable: String },
    CallSite,
}

/// One parameter's effective value, as reported by [`EnvWrapped::explain`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub name: String,
    /// `None` when nothing supplies the parameter; binding would fail on it.
    pub value: Option<Value>,
    pub origin: Option<Origin>,
    pub eligible: bool,
}

/// A callable whose defaults are overridden from the environment on every call.
pub struct EnvWrapped<T> {
    plan: Arc<WrapPlan>,
    target: T,
}

impl<T> EnvWrapped<T> {
    pub fn prefix(&self) -> &str {
        &self.plan.prefix
    }

    pub fn kind(&self) -> CallableKind {
        self.plan.kind
    }

    /// Parameter names environment variables may override.
    pub fn eligible(&self) -> &[String] {
        &self.plan.eligible
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Call a free function or static method.
    pub fn call(&self, args: CallArgs) -> Result<<T as Target<()>>::Output, Error>
    where
        T: Target<()>,
    {
        self.dispatch(&(), args)
    }

    /// Call an instance or class method; `receiver` fills the first parameter.
    pub fn call_method<S: ?Sized>(
        &self,
        receiver: &S,
        args: CallArgs,
    ) -> Result<<T as Target<S>>::Output, Error>
    where
        T: Target<S>,
    {
        self.dispatch(receiver, args)
    }

    /// Final arguments the target would receive, without invoking it.
    pub fn resolve(&self, args: &CallArgs) -> Result<CallArgs, Error> {
        let layered = self.layer(args)?;
        let keywords = layered.into_iter().map(|(k, (v, _))| (k, v)).collect();
        Ok(CallArgs::from_parts(args.positional().to_vec(), keywords))
    }

    /// Effective value and origin for every declared parameter.
    pub fn explain(&self, args: &CallArgs) -> Result<Vec<Resolution>, Error> {
        let mut layered = self.layer(args)?;
        Ok(self
            .plan
            .signature
            .params()
            .iter()
            .map(|p| {
                let (value, origin) = match layered.swap_remove(p.name()) {
                    Some((v, o)) => (Some(v), Some(o)),
                    None => (None, None),
                };
                Resolution {
                    name: p.name().to_string(),
                    value,
                    origin,
                    eligible: self.plan.eligible.iter().any(|e| e == p.name()),
                }
            })
            .collect())
    }

    /// Defaults, then converted environment overrides, then call-site keywords.
    fn layer(&self, args: &CallArgs) -> Result<IndexMap<String, (Value, Origin)>, Error> {
        let mut layered: IndexMap<String, (Value, Origin)> = self
            .plan
            .signature
            .defaults()
            .into_iter()
            .map(|(k, v)| (k, (v, Origin::Default)))
            .collect();

        for (name, (value, variable)) in self.environment_overrides()? {
            layered.insert(name, (value, Origin::Environment { variable }));
        }

        for (name, value) in args.keywords() {
            layered.insert(name.clone(), (value.clone(), Origin::CallSite));
        }

        Ok(layered)
    }

    /// Scan, filter to eligible names and convert.
    fn environment_overrides(&self) -> Result<IndexMap<String, (Value, String)>, Error> {
        let plan = &self.plan;
        let mut overrides = IndexMap::new();

        for (name, candidate) in scan_prefixed(plan.source.as_ref(), &plan.prefix) {
            if !plan.eligible.contains(&name) {
                trace!(variable = %candidate.variable, "ignoring variable with no matching parameter");
                continue;
            }
            let Some(param) = plan.signature.get(&name) else {
                continue;
            };
            let value = convert_override(param, &candidate.raw, &plan.types)?;
            debug!(
                param = %name,
                variable = %candidate.variable,
                value = %value,
                "applying environment override"
            );
            overrides.insert(name, (value, candidate.variable));
        }

        Ok(overrides)
    }

    fn dispatch<S: ?Sized>(
        &self,
        receiver: &S,
        args: CallArgs,
    ) -> Result<<T as Target<S>>::Output, Error>
    where
        T: Target<S>,
    {
        let resolved = self.resolve(&args)?;
        self.target.invoke(receiver, resolved)
    }
}

/// Convert one raw override for `param`.
///
/// Annotation candidates are tried in order and a total miss keeps the raw
/// text. Without an annotation, the type of a non-`None` default is used and a
/// failure is an error, as is a failing entry in `types`.
fn convert_override(param: &Param, raw: &str, types: &TypeMap) -> Result<Value, Error> {
    if let Some(annotation) = param.annotation() {
        return Ok(annotation.convert(raw).unwrap_or_else(|| {
            debug!(
                param = param.name(),
                raw,
                "no annotated type accepted the value, keeping it as text"
            );
            Value::Str(raw.to_string())
        }));
    }

    let conversion = match param.default_value() {
        Some(default) if !default.is_none() => default.value_type().construct(raw),
        _ => match types.get(param.name()) {
            Some(converter) => converter.convert(raw),
            None => return Ok(Value::Str(raw.to_string())),
        },
    };

    conversion.map_err(|source| Error::Conversion {
        param: param.name().to_string(),
        source,
    })
}

impl<T: Inspect> Inspect for EnvWrapped<T> {
    fn signature(&self) -> &Signature {
        &self.plan.signature
    }

    fn underlying(&self) -> Option<&dyn Inspect> {
        Some(&self.target)
    }

    fn descriptor(&self) -> Option<CallableKind> {
        self.target.descriptor()
    }
}

impl<S: ?Sized, T: Target<S>> Target<S> for EnvWrapped<T> {
    type Output = T::Output;

    fn invoke(&self, receiver: &S, args: CallArgs) -> Result<T::Output, Error> {
        self.dispatch(receiver, args)
    }
}
