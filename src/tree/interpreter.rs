//! Evaluates parse trees into bound arguments.
//!
//! Every node yields a sequence of [`NamedParam`]s under its slot name: a
//! terminal yields one, a variable yields as many as the caller bound (zero
//! for an unbound optional), and an internal node yields the single instance
//! its factory builds from the children's values.
use super::node::{InternalNode, ParseNode, TerminalValue};
use crate::store::Registry;
use crate::types::{NamedParam, Param};
use crate::validation::InstantiationError;
use smallvec::SmallVec;

/// Most nodes yield one value; array slots are the exception.
pub type Bindings = SmallVec<[NamedParam; 2]>;

pub fn evaluate(node: &ParseNode, arguments: &[NamedParam], registry: &Registry) -> Result<Bindings, InstantiationError> {
    eval(node, arguments, registry, false)
}

/// Same contract as [`evaluate`], but subtrees without variable nodes are
/// instantiated once and reused.
pub fn evaluate_optimized(node: &ParseNode, arguments: &[NamedParam], registry: &Registry) -> Result<Bindings, InstantiationError> {
    eval(node, arguments, registry, true)
}

fn eval(node: &ParseNode, arguments: &[NamedParam], registry: &Registry, optimize: bool) -> Result<Bindings, InstantiationError> {
    match node {
        ParseNode::Terminal(t) => {
            let param = match &t.value {
                TerminalValue::Constant(c) => Param::Constant(c.clone()),
                TerminalValue::Cell(v) => Param::from(v.clone()),
            };
            Ok(smallvec::smallvec![NamedParam { name: t.slot.clone(), param }])
        }
        ParseNode::Variable(v) => Ok(arguments
            .iter()
            .filter(|a| a.name == v.argument)
            .map(|a| NamedParam { name: v.slot.clone(), param: a.param.clone() })
            .collect()),
        ParseNode::Internal(n) if optimize && n.constant => fold(n, registry),
        ParseNode::Internal(n) => {
            let instance = apply(n, arguments, registry, optimize)?;
            Ok(smallvec::smallvec![NamedParam::new(n.slot.clone(), instance)])
        }
    }
}

fn apply(
    node: &InternalNode,
    arguments: &[NamedParam],
    registry: &Registry,
    optimize: bool,
) -> Result<crate::instance::Instance, InstantiationError> {
    // 1. Evaluate children in order; each result is already named by its slot.
    let mut bound = Vec::with_capacity(node.children.len());
    for child in &node.children {
        bound.extend(eval(child, arguments, registry, optimize)?);
    }
    // 2. Hand the accumulated arguments to the node's factory.
    node.factory.instantiate(registry, bound, optimize)
}

fn fold(node: &InternalNode, registry: &Registry) -> Result<Bindings, InstantiationError> {
    let instance = match node.folded.get() {
        Some(cached) => cached.clone(),
        None => {
            // A constant subtree never reads the caller's arguments.
            let built = apply(node, &[], registry, true)?;
            node.folded.get_or_init(|| built).clone()
        }
    };
    Ok(smallvec::smallvec![NamedParam::new(node.slot.clone(), instance)])
}
