//! Converters
//!
//! One-argument constructors from raw environment text to [`Value`]s, plus the
//! two containers that hold them: annotations (ordered candidates, first success
//! wins) and the caller-supplied type map used as a last resort.

use crate::error::ConversionError;
use crate::value::{Value, ValueType};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type ConvertFn = dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync;

/// A one-argument constructor applied to raw environment text.
#[derive(Clone)]
pub enum Converter {
    /// Builtin runtime type.
    Type(ValueType),
    /// Named caller-supplied function.
    Custom { name: Arc<str>, func: Arc<ConvertFn> },
}

impl Converter {
    /// Wrap a parsing function. Its error is reported through [`ConversionError`]
    /// with `name` as the target.
    pub fn custom<F, V, E>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<V, E> + Send + Sync + 'static,
        V: Into<Value> + 'static,
        E: fmt::Display + 'static,
    {
        let name: Arc<str> = Arc::from(name.into());
        let target = Arc::clone(&name);
        Converter::Custom {
            name,
            func: Arc::new(move |raw: &str| {
                func(raw)
                    .map(Into::into)
                    .map_err(|e| ConversionError::new(target.as_ref(), raw, e))
            }),
        }
    }

    /// Scalar literal parser: `None`, `True`/`False`, integers, floats and
    /// single- or double-quoted strings.
    pub fn literal() -> Self {
        Converter::custom("literal", parse_literal)
    }

    /// Look up a converter by name: builtin type names plus `literal`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.trim().eq_ignore_ascii_case("literal") {
            return Some(Converter::literal());
        }
        ValueType::from_name(name).map(Converter::Type)
    }

    pub fn name(&self) -> &str {
        match self {
            Converter::Type(t) => t.name(),
            Converter::Custom { name, .. } => name.as_ref(),
        }
    }

    pub fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        match self {
            Converter::Type(t) => t.construct(raw),
            Converter::Custom { func, .. } => func(raw),
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converter::Type(t) => write!(f, "Type({})", t),
            Converter::Custom { name, .. } => write!(f, "Custom({})", name),
        }
    }
}

impl From<ValueType> for Converter {
    fn from(t: ValueType) -> Self {
        Converter::Type(t)
    }
}

fn parse_literal(raw: &str) -> Result<Value, String> {
    let text = raw.trim();
    match text {
        "None" => return Ok(Value::None),
        "True" => return Ok(Value::Bool(true)),
        "False" => return Ok(Value::Bool(false)),
        _ => {}
    }

    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            let inner = &text[1..text.len() - 1];
            if inner.contains(quote) {
                return Err("unbalanced quotes".to_string());
            }
            return Ok(Value::Str(inner.to_string()));
        }
    }

    let starts_numeric = text
        .chars()
        .next()
        .map(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
        .unwrap_or(false);
    if !starts_numeric {
        return Err("malformed literal".to_string());
    }
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    match text.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(Value::Float(x)),
        _ => Err("malformed literal".to_string()),
    }
}

/// Declared type hint of a parameter: one or more candidate converters.
#[derive(Debug, Clone)]
pub struct Annotation {
    candidates: Vec<Converter>,
}

impl Annotation {
    pub fn new(converter: impl Into<Converter>) -> Self {
        Self {
            candidates: vec![converter.into()],
        }
    }

    /// Union annotation; members are tried in the given order.
    ///
    /// An empty union is an annotation with no candidates, so conversion always
    /// keeps the raw text.
    pub fn union<I, C>(members: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Converter>,
    {
        Self {
            candidates: members.into_iter().map(Into::into).collect(),
        }
    }

    /// `T | None`.
    pub fn optional(converter: impl Into<Converter>) -> Self {
        Self::union([converter.into(), Converter::Type(ValueType::NoneType)])
    }

    pub fn candidates(&self) -> &[Converter] {
        &self.candidates
    }

    /// First candidate that converts `raw` successfully, or `None` when every
    /// candidate fails.
    pub fn convert(&self, raw: &str) -> Option<Value> {
        self.candidates.iter().find_map(|c| match c.convert(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::trace!(candidate = c.name(), error = %e, "annotation candidate rejected value");
                None
            }
        })
    }
}

impl From<ValueType> for Annotation {
    fn from(t: ValueType) -> Self {
        Annotation::new(t)
    }
}

impl From<Converter> for Annotation {
    fn from(c: Converter) -> Self {
        Annotation::new(c)
    }
}

/// Caller-supplied fallback converters keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct TypeMap {
    converters: HashMap<String, Converter>,
    fallback: Option<Converter>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, param: impl Into<String>, converter: impl Into<Converter>) -> Self {
        self.insert(param, converter);
        self
    }

    /// Converter applied to any parameter name missing from the map.
    pub fn with_fallback(mut self, converter: impl Into<Converter>) -> Self {
        self.fallback = Some(converter.into());
        self
    }

    pub fn insert(&mut self, param: impl Into<String>, converter: impl Into<Converter>) {
        self.converters.insert(param.into(), converter.into());
    }

    pub fn get(&self, param: &str) -> Option<&Converter> {
        self.converters.get(param).or(self.fallback.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty() && self.fallback.is_none()
    }
}

impl<K: Into<String>, C: Into<Converter>> FromIterator<(K, C)> for TypeMap {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        let mut map = TypeMap::new();
        for (k, c) in iter {
            map.insert(k, c);
        }
        map
    }
}
