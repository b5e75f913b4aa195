//! Rule: what a node yields fits where it is plugged in.
use crate::store::InstanceFactory;
use crate::tree::{ParseNode, TerminalValue};
use crate::types::{Constant, ParamType};

/// The type a node presents to its parent, or `None` when only the caller's
/// binding can tell (an argument the enclosing factory does not declare).
pub(crate) fn yielded_type(node: &ParseNode, enclosing: &InstanceFactory) -> Option<ParamType> {
    match node {
        ParseNode::Terminal(t) => Some(match &t.value {
            TerminalValue::Constant(c) => c.param_type(),
            TerminalValue::Cell(_) => ParamType::String,
        }),
        ParseNode::Variable(v) => enclosing.param(&v.argument).map(|info| info.ty),
        ParseNode::Internal(n) => Some(n.factory.output().param_type()),
    }
}

/// Whether `node` may feed a slot declared as `slot`.
///
/// Mirrors the coercions instantiation performs: primitives coerce among
/// themselves, a replacer slot wraps any plain value, and a matcher slot
/// accepts only a matcher.
pub(crate) fn fits(node: &ParseNode, yielded: ParamType, slot: ParamType) -> bool {
    if yielded == slot {
        return true;
    }
    match (node, slot) {
        // Constants are known, so coerce the real value.
        (ParseNode::Terminal(t), _) if slot.is_primitive() => match &t.value {
            TerminalValue::Constant(c) => c.convert(slot).is_some(),
            TerminalValue::Cell(_) => true,
        },
        (_, ParamType::Replacer) => yielded.is_primitive(),
        (ParseNode::Variable(_), _) => yielded.is_primitive() && slot.is_primitive(),
        _ => false,
    }
}

/// A readable rendering of a terminal for diagnostics.
pub(crate) fn describe_constant(c: &Constant) -> String {
    format!("{} '{}'", c.param_type(), c)
}
