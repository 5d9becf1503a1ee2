//! Pattern atoms: the building blocks watchers and queries match quads against.

use std::fmt;
use std::rc::Rc;

use crate::quad::{Quad, Slot};
use crate::value::Value;

/// What a single slot of a pattern quad demands of the quad it's tested
/// against.
#[derive(Clone, Debug)]
pub enum PatternAtom {
    /// Matches only this exact value.
    Constant(Value),
    /// Binds whatever value occupies the slot to a named variable.
    /// Two occurrences of the same name within one pattern quad (or
    /// across the pattern quads of one watcher) must bind equal values.
    Variable(Rc<str>),
    /// Matches any value, binding nothing.
    Wildcard,
}

impl PatternAtom {
    /// Shorthand for `PatternAtom::Variable`.
    pub fn var(name: impl Into<Rc<str>>) -> Self {
        PatternAtom::Variable(name.into())
    }

    /// Shorthand for `PatternAtom::Constant`.
    pub fn constant(v: impl Into<Value>) -> Self {
        PatternAtom::Constant(v.into())
    }

    /// True if this atom contributes no binding (a constant or wildcard).
    pub fn is_bound(&self) -> bool {
        !matches!(self, PatternAtom::Variable(_))
    }

    /// The variable name, if this atom is a variable.
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            PatternAtom::Variable(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for PatternAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternAtom::Constant(v) => write!(f, "{v}"),
            PatternAtom::Variable(name) => write!(f, "?{name}"),
            PatternAtom::Wildcard => write!(f, "_"),
        }
    }
}

/// A quad-shaped pattern: one [`PatternAtom`] per slot.
#[derive(Clone, Debug)]
pub struct PatternQuad {
    entity: PatternAtom,
    attribute: PatternAtom,
    value: PatternAtom,
    context: PatternAtom,
}

impl PatternQuad {
    pub fn new(
        entity: PatternAtom,
        attribute: PatternAtom,
        value: PatternAtom,
        context: PatternAtom,
    ) -> Self {
        PatternQuad {
            entity,
            attribute,
            value,
            context,
        }
    }

    /// The atom occupying the named slot.
    pub fn get(&self, slot: Slot) -> &PatternAtom {
        match slot {
            Slot::Entity => &self.entity,
            Slot::Attribute => &self.attribute,
            Slot::Value => &self.value,
            Slot::Context => &self.context,
        }
    }

    /// The four atoms, in entity/attribute/value/context order.
    pub fn atoms(&self) -> [&PatternAtom; 4] {
        [&self.entity, &self.attribute, &self.value, &self.context]
    }

    /// Number of slots pinned to a constant. Used to pick the most
    /// selective index when scanning for candidate quads.
    pub fn bound_count(&self) -> usize {
        self.atoms()
            .iter()
            .filter(|a| matches!(a, PatternAtom::Constant(_)))
            .count()
    }

    /// Every distinct variable name referenced by this pattern quad, in
    /// first-occurrence order.
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for atom in self.atoms() {
            if let Some(name) = atom.variable_name() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Tests a concrete quad against this pattern in isolation, ignoring
    /// cross-slot or cross-pattern variable repetition (callers that care
    /// about repeated variables must check bindings themselves).
    pub fn matches_shape(&self, quad: &Quad) -> bool {
        self.atoms().iter().zip(quad.slots()).all(|(atom, val)| match atom {
            PatternAtom::Constant(c) => c == val,
            PatternAtom::Variable(_) | PatternAtom::Wildcard => true,
        })
    }
}
