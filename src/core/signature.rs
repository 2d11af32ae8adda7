//! Declared operation signatures.
//!
//! A [`Signature`] is the raw shape of an operation exactly as the user
//! registered it: ordered parameter types and ordered return types,
//! including any context parameter or failure return. Normalization is the
//! inspector's job, not the signature's.

use crate::core::types::{Context, Failure, TypeDescriptor};
use std::fmt;

/// Raw, un-normalized operation signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<TypeDescriptor>,
    returns: Vec<TypeDescriptor>,
}

impl Signature {
    /// Empty signature: no parameters, no returns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a signature from descriptor lists.
    pub fn from_parts(params: Vec<TypeDescriptor>, returns: Vec<TypeDescriptor>) -> Self {
        Self { params, returns }
    }

    /// Append a parameter of type `T`.
    pub fn param<T: ?Sized + 'static>(self) -> Self {
        self.param_type(TypeDescriptor::of::<T>())
    }

    /// Append a parameter by descriptor.
    pub fn param_type(mut self, ty: TypeDescriptor) -> Self {
        self.params.push(ty);
        self
    }

    /// Append a return of type `T`. `()` means "returns nothing" and is
    /// not recorded.
    pub fn returns<T: ?Sized + 'static>(self) -> Self {
        self.return_type(TypeDescriptor::of::<T>())
    }

    /// Append a return by descriptor. The unit type is not recorded.
    pub fn return_type(mut self, ty: TypeDescriptor) -> Self {
        if !ty.is_unit() {
            self.returns.push(ty);
        }
        self
    }

    /// Append the well-known context type as a parameter.
    pub fn context(self) -> Self {
        self.param::<Context>()
    }

    /// Append the well-known failure type as a return.
    pub fn fallible(self) -> Self {
        self.returns::<Failure>()
    }

    /// Declared parameter types, in order.
    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    /// Declared return types, in order.
    pub fn returns_list(&self) -> &[TypeDescriptor] {
        &self.returns
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_shape(f, &self.params, &self.returns)
    }
}

/// Render `fn(A, B) -> R` / `fn(A) -> (R, S)` / `fn()`.
pub(crate) fn write_shape(
    f: &mut impl fmt::Write,
    params: &[TypeDescriptor],
    returns: &[TypeDescriptor],
) -> fmt::Result {
    f.write_str("fn(")?;
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", p)?;
    }
    f.write_str(")")?;

    match returns {
        [] => Ok(()),
        [single] => write!(f, " -> {}", single),
        many => {
            f.write_str(" -> (")?;
            for (i, r) in many.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", r)?;
            }
            f.write_str(")")
        }
    }
}

/// Build a [`Signature`] from a function-type-like spelling.
///
/// ```rust,ignore
/// use combinefn::prelude::*;
///
/// let merge = signature!(fn(Context, i64, i64) -> (i64, Failure));
/// let create = signature!(fn() -> MyAccum);
/// let sink = signature!(fn(i64, i64));
/// ```
///
/// A parenthesized return list declares several returns; `-> ()` and a
/// missing arrow both declare none.
#[macro_export]
macro_rules! signature {
    (fn($($param:ty),* $(,)?) -> ($($ret:ty),* $(,)?)) => {{
        $crate::core::signature::Signature::new()
            $(.param::<$param>())*
            $(.returns::<$ret>())*
    }};
    (fn($($param:ty),* $(,)?) -> $ret:ty) => {{
        $crate::core::signature::Signature::new()
            $(.param::<$param>())*
            .returns::<$ret>()
    }};
    (fn($($param:ty),* $(,)?)) => {{
        $crate::core::signature::Signature::new()
            $(.param::<$param>())*
    }};
}
