//! Ergonomic construction of pattern quads.
//!
//! `qw_model::PatternQuad` already has the shape the engine needs; these
//! free functions just save callers from spelling out `PatternAtom`
//! variants at every call site.

use qw_model::{PatternAtom, PatternQuad, Value};

/// Binds whatever value occupies the slot to `name`.
pub fn var(name: impl Into<std::rc::Rc<str>>) -> PatternAtom {
    PatternAtom::var(name)
}

/// Matches only `value`.
pub fn lit(value: impl Into<Value>) -> PatternAtom {
    PatternAtom::constant(value)
}

/// Matches any value, binding nothing.
pub fn wildcard() -> PatternAtom {
    PatternAtom::Wildcard
}

/// Builds a [`PatternQuad`] from four atoms, in entity/attribute/value/
/// context order.
pub fn pq(entity: PatternAtom, attribute: PatternAtom, value: PatternAtom, context: PatternAtom) -> PatternQuad {
    PatternQuad::new(entity, attribute, value, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qw_model::Slot;

    #[test]
    fn pq_assembles_atoms_in_slot_order() {
        let p = pq(var("p"), lit("age"), var("a"), wildcard());
        assert!(matches!(p.get(Slot::Entity), PatternAtom::Variable(_)));
        assert!(matches!(p.get(Slot::Attribute), PatternAtom::Constant(_)));
        assert!(matches!(p.get(Slot::Value), PatternAtom::Variable(_)));
        assert!(matches!(p.get(Slot::Context), PatternAtom::Wildcard));
    }
}
