//! Wrap Targets
//!
//! Callables that can be wrapped, paired with their declared signatures, and
//! the descriptor layers that may sit on top of them.

use crate::args::{Arguments, CallArgs};
use crate::error::Error;
use crate::signature::{CallableKind, Signature};

/// Access to a callable's declared parameters and to the callable it wraps.
pub trait Inspect {
    fn signature(&self) -> &Signature;

    /// The callable one wrapping level down, if this is a wrapper.
    fn underlying(&self) -> Option<&dyn Inspect> {
        None
    }

    /// Kind this layer declares about itself, if it is a method descriptor.
    fn descriptor(&self) -> Option<CallableKind> {
        None
    }
}

/// A callable invoked with a receiver of type `S` (`()` for free functions).
pub trait Target<S: ?Sized = ()>: Inspect {
    type Output;

    /// Bind `args` against the signature and run the callable.
    fn invoke(&self, receiver: &S, args: CallArgs) -> Result<Self::Output, Error>;
}

/// Follow [`Inspect::underlying`] down to the innermost callable.
pub fn root_callable(callable: &dyn Inspect) -> &dyn Inspect {
    let mut current = callable;
    while let Some(inner) = current.underlying() {
        current = inner;
    }
    current
}

/// Free function taking its bound arguments.
pub struct Function<F> {
    signature: Signature,
    func: F,
}

impl<F> Function<F> {
    pub fn new(signature: Signature, func: F) -> Self {
        Self { signature, func }
    }
}

impl<F> Inspect for Function<F> {
    fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl<F, R> Target<()> for Function<F>
where
    F: Fn(Arguments) -> R,
{
    type Output = R;

    fn invoke(&self, _receiver: &(), args: CallArgs) -> Result<R, Error> {
        let bound = self.signature.bind(args, false)?;
        Ok((self.func)(bound))
    }
}

/// Method whose first declared parameter is filled by the receiver.
pub struct Method<F> {
    signature: Signature,
    func: F,
}

impl<F> Method<F> {
    pub fn new(signature: Signature, func: F) -> Self {
        Self { signature, func }
    }
}

impl<F> Inspect for Method<F> {
    fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl<S: ?Sized, F, R> Target<S> for Method<F>
where
    F: Fn(&S, Arguments) -> R,
{
    type Output = R;

    fn invoke(&self, receiver: &S, args: CallArgs) -> Result<R, Error> {
        let bound = self.signature.bind(args, true)?;
        Ok((self.func)(receiver, bound))
    }
}

/// Class-method descriptor around another callable.
pub struct ClassMethod<T>(pub T);

/// Static-method descriptor around another callable.
pub struct StaticMethod<T>(pub T);

macro_rules! descriptor {
    ($name:ident, $kind:expr) => {
        impl<T: Inspect> Inspect for $name<T> {
            fn signature(&self) -> &Signature {
                self.0.signature()
            }

            fn underlying(&self) -> Option<&dyn Inspect> {
                Some(&self.0)
            }

            fn descriptor(&self) -> Option<CallableKind> {
                Some($kind)
            }
        }

        impl<S: ?Sized, T: Target<S>> Target<S> for $name<T> {
            type Output = T::Output;

            fn invoke(&self, receiver: &S, args: CallArgs) -> Result<T::Output, Error> {
                self.0.invoke(receiver, args)
            }
        }
    };
}

descriptor!(ClassMethod, CallableKind::ClassMethod);
descriptor!(StaticMethod, CallableKind::StaticMethod);
