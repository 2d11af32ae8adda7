//! Type identities used to compare operation signatures.
//!
//! Signatures are compared by type identity, never by spelling. A
//! [`TypeDescriptor`] either wraps a Rust [`TypeId`] or a declared opaque
//! name (used by manifests that describe types the process cannot name).
//! Two descriptors are equal exactly when their keys are equal; the display
//! name plays no part in comparisons.
//!
//! The two well-known calling-convention types also live here:
//! - [`Context`]: the optional leading parameter of every operation
//! - [`Failure`]: the optional trailing return of every operation

use serde::{Serialize, Serializer};
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Identity key of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// A type known to the Rust type system.
    Native(TypeId),
    /// An opaque type declared by name (e.g. in a manifest).
    Declared(Arc<str>),
}

/// A type as it appears in an operation signature.
///
/// Cheap to clone. Equality and hashing only consider the [`TypeKey`].
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    key: TypeKey,
    name: Arc<str>,
}

impl TypeDescriptor {
    /// Descriptor for a Rust type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::Native(TypeId::of::<T>()),
            name: short_type_name(type_name::<T>()).into(),
        }
    }

    /// Descriptor for an opaque declared type.
    ///
    /// Declared types with the same name are the same type. They never
    /// equal a native type, even one with the same display name.
    pub fn declared(name: impl Into<String>) -> Self {
        let name: Arc<str> = name.into().into();
        Self {
            key: TypeKey::Declared(name.clone()),
            name,
        }
    }

    /// Descriptor of the well-known context type.
    pub fn context() -> Self {
        Self::of::<Context>()
    }

    /// Descriptor of the well-known failure type.
    pub fn failure() -> Self {
        Self::of::<Failure>()
    }

    /// Descriptor of the unit type, used for "no value".
    pub fn unit() -> Self {
        Self::of::<()>()
    }

    /// Whether this is the context type.
    pub fn is_context(&self) -> bool {
        self.key == TypeKey::Native(TypeId::of::<Context>())
    }

    /// Whether this is the failure type.
    pub fn is_failure(&self) -> bool {
        self.key == TypeKey::Native(TypeId::of::<Failure>())
    }

    /// Whether this is the unit type.
    pub fn is_unit(&self) -> bool {
        self.key == TypeKey::Native(TypeId::of::<()>())
    }

    /// Identity key.
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Human-readable name with module paths stripped.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

/// Strip module paths from a `std::any::type_name` string.
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                out.truncate(segment_start);
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' | '*' => {
                out.push(c);
                segment_start = out.len();
            }
            _ => out.push(c),
        }
    }

    out
}

// ============================================================================
// Well-known calling-convention types
// ============================================================================

/// Cancellation, deadline and environment handle threaded through
/// operations that opt into it.
///
/// When present it must be the leading parameter of an operation; the
/// validator strips it before any arity or type rule runs.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
    values: Arc<HashMap<String, String>>,
}

impl Context {
    /// Create a context with no deadline and an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context that expires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            ..self.clone()
        }
    }

    /// Derive a context carrying an extra environment value.
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = (*self.values).clone();
        values.insert(key.into(), value.into());
        Self {
            values: Arc::new(values),
            ..self.clone()
        }
    }

    /// Look up an environment value.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Signal cancellation to every context derived from the same root.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the context was cancelled or its deadline has passed.
    pub fn is_done(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.map_or(false, |d| Instant::now() >= d)
    }
}

/// Error value returned by fallible operations.
///
/// When present it must be the trailing return of an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    message: String,
}

impl Failure {
    /// Create a failure with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for Failure {
    fn from(error: anyhow::Error) -> Self {
        Self::new(format!("{:#}", error))
    }
}
