//! Canonical value model for quad slots.
//!
//! A [`Value`] is the only payload a quad slot can carry. Entities,
//! attributes, values and contexts are mutually comparable so that a
//! context introduced on one quad can later appear as the entity of
//! another — quads describing quads fall out of this for free.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// FNV-1a 64-bit offset basis, chosen so value hashes stay stable across
/// process runs (unlike `RandomState`-seeded hashers).
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Mixes a type tag into a sub-hash so that e.g. `Number(0.0)` and
/// `Bool(false)` never collide just because their payload bits agree.
fn mix_tagged(tag: u8, h: u64) -> u64 {
    let mut x = FNV_OFFSET ^ u64::from(tag);
    x = x.wrapping_mul(FNV_PRIME);
    x ^= h;
    x.wrapping_mul(FNV_PRIME)
}

/// Equality/hash hook for opaque external references (host-supplied
/// identity, e.g. a URI type owned by an embedding application).
///
/// The only contract the core requires: `value_eq` is an equivalence
/// relation, and `value_hash` agrees with it.
pub trait ExternalValue: fmt::Debug {
    /// Structural equality, defined by the host.
    fn value_eq(&self, other: &dyn ExternalValue) -> bool;
    /// Stable 64-bit hash; must agree with [`ExternalValue::value_eq`].
    fn value_hash(&self) -> u64;
}

/// A reference-counted, host-defined opaque value.
#[derive(Clone)]
pub struct ExternalRef(pub Rc<dyn ExternalValue>);

impl PartialEq for ExternalRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.value_eq(other.0.as_ref())
    }
}

impl Eq for ExternalRef {}

impl fmt::Debug for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "External({:?})", self.0)
    }
}

/// A simple [`ExternalValue`] wrapping any `Eq + Hash` Rust value, for
/// hosts that don't need custom equality semantics.
#[derive(Debug)]
pub struct OpaqueId<T>(pub T);

impl<T: fmt::Debug + PartialEq + Hash> ExternalValue for OpaqueId<T> {
    fn value_eq(&self, other: &dyn ExternalValue) -> bool {
        // Best-effort: compare debug representations when the concrete
        // type on the other side is unknown to us. Hosts wanting exact
        // typed equality should implement `ExternalValue` directly.
        format!("{:?}", self.0) == format!("{:?}", other)
    }

    fn value_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.0.hash(&mut hasher);
        hasher.finish()
    }
}

/// A quad-slot payload.
///
/// `Value` supports only equality and hashing; interpreting the payload
/// (case-folding, numeric coercion, URI resolution, ...) is an external
/// collaborator's job, never the core's.
#[derive(Clone, Debug)]
pub enum Value {
    /// An identifier/atom, e.g. `alice` or `status`.
    Symbol(Rc<str>),
    /// A finite 64-bit float (construction rejects NaN, see [`Value::number`]).
    Number(f64),
    /// An arbitrary string payload.
    String(Rc<str>),
    /// A boolean.
    Bool(bool),
    /// The null/absent value.
    Null,
    /// An opaque reference owned by an external collaborator.
    External(ExternalRef),
}

impl Value {
    /// Builds a [`Value::Symbol`].
    pub fn symbol(name: impl Into<Rc<str>>) -> Self {
        Value::Symbol(name.into())
    }

    /// Builds a [`Value::String`].
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Builds a [`Value::Number`], rejecting NaN so equality stays total.
    pub fn number(n: f64) -> Option<Self> {
        if n.is_nan() {
            None
        } else {
            Some(Value::Number(n))
        }
    }

    /// Builds a [`Value::External`] from any [`ExternalValue`].
    pub fn external(v: impl ExternalValue + 'static) -> Self {
        Value::External(ExternalRef(Rc::new(v)))
    }

    /// Stable 64-bit hash of this value, independent of `RandomState`.
    pub fn hash64(&self) -> u64 {
        match self {
            Value::Symbol(s) => mix_tagged(0, fnv1a(s.as_bytes())),
            Value::Number(n) => mix_tagged(1, n.to_bits()),
            Value::String(s) => mix_tagged(2, fnv1a(s.as_bytes())),
            Value::Bool(b) => mix_tagged(3, u64::from(*b)),
            Value::Null => mix_tagged(4, 0),
            Value::External(e) => mix_tagged(5, e.0.value_hash()),
        }
    }

    /// Renders the value's tag name, used in error messages and tracing.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Symbol(_) => "symbol",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::External(_) => "external",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::External(a), Value::External(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash64());
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "null"),
            Value::External(e) => write!(f, "{e:?}"),
        }
    }
}

// Bare `&str` converts to `Symbol`: callers write `store.add("alice", "age",
// 30, ctx)` expecting `alice`/`age` to behave like RDF-style atoms (equal by
// name, distinct from the `String` kind), the way the rest of this crate's
// examples and tests construct values. Callers who want an explicit
// `String` payload call `Value::string(...)` directly.
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::symbol(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Symbol(Rc::from(s))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        Value::Number(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        // NaN collapses to Null: a `From` conversion cannot fail, and
        // `Value::number` is there for callers who need to reject it.
        if n.is_nan() {
            Value::Null
        } else {
            Value::Number(n)
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Equality predicate, spelled out as a free function to match the
/// `equal(a, b)` / `hash(v)` contract external collaborators rely on.
pub fn equal(a: &Value, b: &Value) -> bool {
    a == b
}

/// Free-function form of [`Value::hash64`].
pub fn hash(v: &Value) -> u64 {
    v.hash64()
}

/// Manual `serde` impls: `Value` can't `#[derive]` because of the
/// `External` variant's trait object, so the remaining variants get a
/// tagged representation and `External` fails serialization with a
/// descriptive error rather than silently dropping data.
#[cfg(feature = "serde")]
mod serde_impl {
    use super::Value;
    use serde::de::{self, Deserialize, Deserializer};
    use serde::ser::{Error as _, Serialize, Serializer};

    #[derive(serde::Serialize, serde::Deserialize)]
    enum Repr {
        Symbol(String),
        Number(f64),
        String(String),
        Bool(bool),
        Null,
    }

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Symbol(s) => Repr::Symbol(s.to_string()).serialize(serializer),
                Value::Number(n) => Repr::Number(*n).serialize(serializer),
                Value::String(s) => Repr::String(s.to_string()).serialize(serializer),
                Value::Bool(b) => Repr::Bool(*b).serialize(serializer),
                Value::Null => Repr::Null.serialize(serializer),
                Value::External(_) => Err(S::Error::custom(
                    "external values have no host-independent serialization; the collaborator owning them must serialize separately",
                )),
            }
        }
    }

    impl<'de> Deserialize<'de> for Value {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            match Repr::deserialize(deserializer)? {
                Repr::Symbol(s) => Ok(Value::symbol(s)),
                Repr::Number(n) => Value::number(n).ok_or_else(|| de::Error::custom("Value::Number cannot hold NaN")),
                Repr::String(s) => Ok(Value::string(s)),
                Repr::Bool(b) => Ok(Value::Bool(b)),
                Repr::Null => Ok(Value::Null),
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_values_hash_equal() {
        let a = Value::symbol("alice");
        let b = Value::symbol("alice");
        assert!(equal(&a, &b));
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn different_kinds_are_unequal_even_with_same_payload_bits() {
        let n = Value::Number(0.0);
        let b = Value::Bool(false);
        assert!(!equal(&n, &b));
    }

    #[test]
    fn symbol_and_string_are_distinct_kinds() {
        let sym = Value::symbol("bob");
        let s = Value::string("bob");
        assert!(!equal(&sym, &s));
    }

    #[test]
    fn number_rejects_nan() {
        assert!(Value::number(f64::NAN).is_none());
        assert!(Value::number(1.5).is_some());
    }

    #[test]
    fn from_conversions() {
        assert_eq!(Value::from("x"), Value::symbol("x"));
        assert_eq!(Value::from(String::from("x")), Value::symbol("x"));
        assert_eq!(Value::from(42i64), Value::Number(42.0));
        assert_eq!(Value::from(true), Value::Bool(true));
    }

    #[test]
    fn external_ref_uses_host_equality() {
        let a = Value::external(OpaqueId(7u32));
        let b = Value::external(OpaqueId(7u32));
        let c = Value::external(OpaqueId(8u32));
        assert!(equal(&a, &b));
        assert!(!equal(&a, &c));
    }
}
