//! Parameter Signatures
//!
//! Declared parameter metadata for a wrapped callable: names, defaults and type
//! annotations in declaration order. Rust offers no runtime reflection of these,
//! so callers describe them once and hand them over with the callable.

use crate::args::{Arguments, CallArgs};
use crate::convert::Annotation;
use crate::error::Error;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Parameter descriptor.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    default: Option<Value>,
    annotation: Option<Annotation>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            annotation: None,
        }
    }

    /// Declared default. `Value::None` is a real default, distinct from having none.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn annotated(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Ordered parameter list of a callable.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new(params: impl IntoIterator<Item = Param>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn first(&self) -> Option<&Param> {
        self.params.first()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Declared defaults keyed by parameter name, in declaration order.
    pub fn defaults(&self) -> IndexMap<String, Value> {
        self.params
            .iter()
            .filter_map(|p| p.default.clone().map(|d| (p.name.clone(), d)))
            .collect()
    }

    /// Reject parameter lists no callable could declare: empty or duplicate
    /// names, and a parameter without default following one with a default.
    ///
    /// Keyword-only parameters are not modelled, so a required parameter after
    /// a defaulted one is rejected even though keyword-only declarations allow
    /// that shape.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        let mut saw_default = false;
        for param in &self.params {
            if param.name.trim().is_empty() {
                return Err(Error::InvalidSignature(
                    "parameter name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(Error::InvalidSignature(format!(
                    "duplicate parameter '{}'",
                    param.name
                )));
            }
            if param.has_default() {
                saw_default = true;
            } else if saw_default {
                return Err(Error::InvalidSignature(format!(
                    "parameter '{}' without a default follows a parameter with a default",
                    param.name
                )));
            }
        }
        Ok(())
    }

    /// Bind call arguments to parameters.
    ///
    /// With `receiver_bound` the first declared parameter is already filled by
    /// the receiver and takes neither positional nor keyword values. Missing
    /// parameters take their declared default.
    pub fn bind(&self, args: CallArgs, receiver_bound: bool) -> Result<Arguments, Error> {
        let (receiver, slots) = match (receiver_bound, self.params.split_first()) {
            (true, Some((first, rest))) => (Some(first), rest),
            _ => (None, self.params.as_slice()),
        };
        let (positional, keywords) = args.into_parts();

        if positional.len() > slots.len() {
            return Err(Error::TooManyPositional {
                expected: slots.len(),
                given: positional.len(),
            });
        }

        let mut bound: IndexMap<String, Value> = slots
            .iter()
            .zip(positional)
            .map(|(p, v)| (p.name.clone(), v))
            .collect();

        for (name, value) in keywords {
            if receiver.is_some_and(|r| r.name == name) || bound.contains_key(&name) {
                return Err(Error::DuplicateArgument(name));
            }
            if !slots.iter().any(|p| p.name == name) {
                return Err(Error::UnexpectedKeyword(name));
            }
            bound.insert(name, value);
        }

        let mut ordered = IndexMap::with_capacity(slots.len());
        for param in slots {
            let value = match bound.swap_remove(&param.name) {
                Some(v) => v,
                None => param
                    .default
                    .clone()
                    .ok_or_else(|| Error::MissingArgument(param.name.clone()))?,
            };
            ordered.insert(param.name.clone(), value);
        }
        Ok(Arguments::new(ordered))
    }
}

/// What kind of callable is being wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Function,
    InstanceMethod,
    ClassMethod,
    StaticMethod,
}

impl CallableKind {
    /// Whether the first declared parameter is an implicit receiver.
    pub fn has_receiver(self) -> bool {
        matches!(self, CallableKind::InstanceMethod | CallableKind::ClassMethod)
    }
}

/// Guess the kind from the first parameter name: `self` or `cls` mark a method.
///
/// A heuristic only. A free function whose first parameter happens to be called
/// `self` is misclassified; pass an explicit method flag to bypass it.
pub fn classify(signature: &Signature) -> CallableKind {
    match signature.first().map(Param::name) {
        Some("self") => CallableKind::InstanceMethod,
        Some("cls") => CallableKind::ClassMethod,
        _ => CallableKind::Function,
    }
}
