//! The quad: the one fact shape the store knows how to store.

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::value::{self, Value};

/// Names the four slots of a [`Quad`], used by patterns and indexes to
/// talk about "which slot" without repeating the quad shape everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Entity,
    Attribute,
    Value,
    Context,
}

impl Slot {
    /// All four slots, in entity/attribute/value/context order.
    pub const ALL: [Slot; 4] = [Slot::Entity, Slot::Attribute, Slot::Value, Slot::Context];
}

/// A single stored fact: `(entity, attribute, value, context)`.
///
/// Equality and hashing ignore `seq` — two quads with identical slots
/// are the same quad regardless of when each was constructed. `seq` is
/// carried on the struct purely so the store can order quads by
/// insertion without a side table.
#[derive(Clone, Debug)]
pub struct Quad {
    entity: Value,
    attribute: Value,
    value: Value,
    context: Value,
    /// Monotonic insertion sequence, assigned by the store. Not part of
    /// identity: see the `PartialEq`/`Hash` impls below.
    seq: u64,
    /// Cached combined hash of the four slots (not including `seq`).
    hash: u64,
}

/// Combines four slot hashes into one, mixing each into an accumulator
/// so the order of slots (not just their set) matters.
fn combine(parts: [u64; 4]) -> u64 {
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut acc = 0xcbf2_9ce4_8422_2325u64;
    for p in parts {
        acc ^= p;
        acc = acc.wrapping_mul(PRIME);
    }
    acc
}

impl Quad {
    /// Builds a quad with the given slots and insertion sequence.
    pub fn new(entity: Value, attribute: Value, value: Value, context: Value, seq: u64) -> Self {
        let hash = combine([
            value::hash(&entity),
            value::hash(&attribute),
            value::hash(&value),
            value::hash(&context),
        ]);
        Quad {
            entity,
            attribute,
            value,
            context,
            seq,
            hash,
        }
    }

    pub fn entity(&self) -> &Value {
        &self.entity
    }

    pub fn attribute(&self) -> &Value {
        &self.attribute
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Insertion sequence assigned by the store. Used for deterministic
    /// ordering, never for identity.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The slot value named by `slot`.
    pub fn get(&self, slot: Slot) -> &Value {
        match slot {
            Slot::Entity => &self.entity,
            Slot::Attribute => &self.attribute,
            Slot::Value => &self.value,
            Slot::Context => &self.context,
        }
    }

    /// Precomputed combined hash of the four slots, ignoring `seq`.
    pub fn content_hash(&self) -> u64 {
        self.hash
    }

    /// The four slots as an array, in entity/attribute/value/context order.
    pub fn slots(&self) -> [&Value; 4] {
        [&self.entity, &self.attribute, &self.value, &self.context]
    }
}

impl PartialEq for Quad {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && value::equal(&self.entity, &other.entity)
            && value::equal(&self.attribute, &other.attribute)
            && value::equal(&self.value, &other.value)
            && value::equal(&self.context, &other.context)
    }
}

impl Eq for Quad {}

impl Hash for Quad {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// The shared, reference-counted handle a store hands out for a quad.
/// Cheap to clone, never mutated after construction.
pub type QuadRef = Rc<Quad>;

/// Manual `serde` impl: only the four slots round-trip. `seq` is
/// insertion order assigned by a store, not part of a quad's identity,
/// so a deserialized quad always carries `seq = 0` until it is (re-)
/// inserted.
#[cfg(feature = "serde")]
mod serde_impl {
    use super::Quad;
    use crate::value::Value;
    use serde::de::{Deserialize, Deserializer};
    use serde::ser::{Serialize, SerializeStruct, Serializer};

    impl Serialize for Quad {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut s = serializer.serialize_struct("Quad", 4)?;
            s.serialize_field("entity", &self.entity)?;
            s.serialize_field("attribute", &self.attribute)?;
            s.serialize_field("value", &self.value)?;
            s.serialize_field("context", &self.context)?;
            s.end()
        }
    }

    #[derive(serde::Deserialize)]
    struct QuadRepr {
        entity: Value,
        attribute: Value,
        value: Value,
        context: Value,
    }

    impl<'de> Deserialize<'de> for Quad {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let repr = QuadRepr::deserialize(deserializer)?;
            Ok(Quad::new(repr.entity, repr.attribute, repr.value, repr.context, 0))
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn round_trips_slots_but_resets_seq() {
        let original = Quad::new(
            Value::symbol("alice"),
            Value::symbol("knows"),
            Value::symbol("bob"),
            Value::symbol("c1"),
            7,
        );
        let json = serde_json::to_string(&original).unwrap();
        let back: Quad = serde_json::from_str(&json).unwrap();
        assert_eq!(original, back);
        assert_eq!(back.seq(), 0);
    }
}
