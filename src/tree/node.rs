//! Parse-tree nodes for composed rules.
use crate::instance::Instance;
use crate::store::InstanceFactory;
use crate::types::{Constant, SpreadsheetVariable};
use std::sync::{Arc, OnceLock};

/// The value a terminal node contributes.
#[derive(Debug, Clone)]
pub enum TerminalValue {
    Constant(Constant),
    /// Read lazily when the rule runs, never while the tree is built.
    Cell(SpreadsheetVariable),
}

#[derive(Debug)]
pub struct TerminalNode {
    pub(crate) slot: String,
    pub(crate) value: TerminalValue,
}

/// A substitution point bound to one of the enclosing factory's arguments.
#[derive(Debug)]
pub struct VariableNode {
    pub(crate) slot: String,
    pub(crate) argument: String,
}

/// A factory applied to the values of its children.
#[derive(Debug)]
pub struct InternalNode {
    pub(crate) slot: String,
    pub(crate) factory: Arc<InstanceFactory>,
    pub(crate) children: Vec<ParseNode>,
    /// Whether no variable node occurs anywhere below.
    pub(crate) constant: bool,
    pub(crate) folded: OnceLock<Instance>,
}

#[derive(Debug)]
pub enum ParseNode {
    Terminal(TerminalNode),
    Variable(VariableNode),
    Internal(InternalNode),
}

impl ParseNode {
    /// `slot` is the parent argument this node binds.
    pub fn constant(slot: impl Into<String>, value: Constant) -> Self {
        ParseNode::Terminal(TerminalNode { slot: slot.into(), value: TerminalValue::Constant(value) })
    }

    pub fn cell(slot: impl Into<String>, target: SpreadsheetVariable) -> Self {
        ParseNode::Terminal(TerminalNode { slot: slot.into(), value: TerminalValue::Cell(target) })
    }

    /// Binds the parent slot to every argument named `argument`.
    pub fn variable(slot: impl Into<String>, argument: impl Into<String>) -> Self {
        ParseNode::Variable(VariableNode { slot: slot.into(), argument: argument.into() })
    }

    pub fn internal(slot: impl Into<String>, factory: Arc<InstanceFactory>, children: Vec<ParseNode>) -> Self {
        let constant = children.iter().all(ParseNode::is_constant);
        ParseNode::Internal(InternalNode {
            slot: slot.into(),
            factory,
            children,
            constant,
            folded: OnceLock::new(),
        })
    }

    pub fn slot(&self) -> &str {
        match self {
            ParseNode::Terminal(n) => &n.slot,
            ParseNode::Variable(n) => &n.slot,
            ParseNode::Internal(n) => &n.slot,
        }
    }

    /// True when evaluation never depends on the caller's arguments.
    pub fn is_constant(&self) -> bool {
        match self {
            ParseNode::Terminal(_) => true,
            ParseNode::Variable(_) => false,
            ParseNode::Internal(n) => n.constant,
        }
    }

    pub fn children(&self) -> &[ParseNode] {
        match self {
            ParseNode::Internal(n) => &n.children,
            _ => &[],
        }
    }

    pub fn factory(&self) -> Option<&Arc<InstanceFactory>> {
        match self {
            ParseNode::Internal(n) => Some(&n.factory),
            _ => None,
        }
    }
}
