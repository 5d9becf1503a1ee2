//! Pattern compilation: activation keys and positive/NAC pattern lists.
//!
//! Instead of building a shared discrimination network, each watcher
//! carries its own activation key computed once at `watch` time.

use qw_model::{PatternAtom, PatternQuad, Slot, Value};

use crate::error::{EngineError, EngineResult};

/// The bucket a watcher is filed under in the registry, chosen from the
/// watcher's first pattern quad only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActivationKey {
    /// Filed under `(slot, literal)` — the leftmost literal slot of the
    /// first pattern quad, priority entity > attribute > value > context.
    Literal(Slot, Value),
    /// No literal anywhere in the first pattern quad: matches every quad.
    Wildcard,
}

/// A watcher's compiled pattern set: positive pattern quads plus
/// optional negative application conditions.
#[derive(Clone, Debug)]
pub struct CompiledPatterns {
    pub positive: Vec<PatternQuad>,
    pub nac: Vec<PatternQuad>,
    pub activation_key: ActivationKey,
}

/// Picks the leftmost literal slot of `pattern`, in entity/attribute/
/// value/context priority order.
fn leading_literal(pattern: &PatternQuad) -> Option<(Slot, Value)> {
    for slot in Slot::ALL {
        if let PatternAtom::Constant(v) = pattern.get(slot) {
            return Some((slot, v.clone()));
        }
    }
    None
}

/// Compiles a watcher's pattern quads, validating shape and computing
/// its activation key from the first positive pattern.
///
/// Rejects an empty positive pattern list, and a non-empty NAC list
/// paired with zero positive patterns (a NAC with nothing to complete
/// against can never usefully fire).
pub fn compile(positive: Vec<PatternQuad>, nac: Vec<PatternQuad>) -> EngineResult<CompiledPatterns> {
    if positive.is_empty() {
        return Err(EngineError::InvalidQuad(
            "watcher must have at least one positive pattern quad".into(),
        ));
    }
    if !nac.is_empty() && positive.is_empty() {
        return Err(EngineError::InvalidQuad(
            "NAC patterns require at least one positive pattern".into(),
        ));
    }

    let activation_key = leading_literal(&positive[0])
        .map(|(slot, value)| ActivationKey::Literal(slot, value))
        .unwrap_or(ActivationKey::Wildcard);

    Ok(CompiledPatterns {
        positive,
        nac,
        activation_key,
    })
}
