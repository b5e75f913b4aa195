//! Serializable rule definitions.
//!
//! The in-memory shape a definition source hands to the core: a factory's
//! name, description, formal parameters and either a native binding or a
//! parse tree whose internal nodes refer to other factories by name.
use super::error::RegistryError;
use super::factory::{FactoryBody, InstanceFactory};
use super::registry::Registry;
use crate::instance::{Instance, InstanceKind};
use crate::tree::{interpreter, ParseNode, TerminalValue};
use crate::types::{Constant, ParamInfo, SpreadsheetVariable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub output: InstanceKind,
    #[serde(default)]
    pub params: Vec<ParamInfo>,
    pub body: BodyDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyDefinition {
    Native { id: String },
    Tree { root: NodeDefinition },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeDefinition {
    Constant { slot: String, value: Constant },
    /// `address` uses the `"<sheet>:<row>:<column>"` text form.
    Cell { slot: String, address: String },
    Variable { slot: String, argument: String },
    Factory {
        slot: String,
        factory: String,
        #[serde(default)]
        children: Vec<NodeDefinition>,
    },
}

impl FactoryDefinition {
    /// Builds the factory, looking up referenced factories in `registry`.
    pub fn resolve(&self, registry: &Registry) -> Result<InstanceFactory, RegistryError> {
        Ok(match &self.body {
            BodyDefinition::Native { id } => {
                InstanceFactory::native(&self.name, &self.description, self.output, self.params.clone(), id)
            }
            BodyDefinition::Tree { root } => InstanceFactory::tree(
                &self.name,
                &self.description,
                self.output,
                self.params.clone(),
                root.resolve(registry)?,
            ),
        })
    }

    /// The definition a factory was (or could have been) loaded from.
    pub fn describe(factory: &InstanceFactory) -> Self {
        let body = match factory.body() {
            FactoryBody::Native(id) => BodyDefinition::Native { id: id.clone() },
            FactoryBody::Tree(root) => BodyDefinition::Tree { root: NodeDefinition::describe(root) },
        };
        Self {
            name: factory.name().to_string(),
            description: factory.description().to_string(),
            output: factory.output(),
            params: factory.params().cloned().collect(),
            body,
        }
    }
}

impl NodeDefinition {
    pub fn resolve(&self, registry: &Registry) -> Result<ParseNode, RegistryError> {
        match self {
            NodeDefinition::Constant { slot, value } => Ok(ParseNode::constant(slot, value.clone())),
            NodeDefinition::Cell { slot, address } => Ok(ParseNode::cell(slot, SpreadsheetVariable::parse(address)?)),
            NodeDefinition::Variable { slot, argument } => Ok(ParseNode::variable(slot, argument)),
            NodeDefinition::Factory { slot, factory, children } => {
                let target = registry
                    .factory(factory)
                    .ok_or_else(|| RegistryError::UnknownFactory(factory.clone()))?;
                let children = children
                    .iter()
                    .map(|child| child.resolve(registry))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ParseNode::internal(slot, target, children))
            }
        }
    }

    /// Builds a standalone instance from a factory node.
    ///
    /// Children are evaluated with no bound arguments, so variable nodes
    /// contribute nothing. The node's own slot name is ignored.
    pub fn instantiate(&self, registry: &Registry) -> Result<Instance, RegistryError> {
        let NodeDefinition::Factory { factory, children, .. } = self else {
            return Err(RegistryError::NotAnInstance(self.kind()));
        };
        let mut bound = Vec::with_capacity(children.len());
        for child in children {
            let node = child.resolve(registry)?;
            bound.extend(interpreter::evaluate(&node, &[], registry)?);
        }
        registry.instantiate(factory, bound)
    }

    fn kind(&self) -> &'static str {
        match self {
            NodeDefinition::Constant { .. } => "constant",
            NodeDefinition::Cell { .. } => "cell",
            NodeDefinition::Variable { .. } => "variable",
            NodeDefinition::Factory { .. } => "factory",
        }
    }

    fn describe(node: &ParseNode) -> Self {
        match node {
            ParseNode::Terminal(t) => match &t.value {
                TerminalValue::Constant(c) => NodeDefinition::Constant { slot: t.slot.clone(), value: c.clone() },
                TerminalValue::Cell(v) => NodeDefinition::Cell { slot: t.slot.clone(), address: v.target().to_string() },
            },
            ParseNode::Variable(v) => NodeDefinition::Variable { slot: v.slot.clone(), argument: v.argument.clone() },
            ParseNode::Internal(n) => NodeDefinition::Factory {
                slot: n.slot.clone(),
                factory: n.factory.name().to_string(),
                children: n.children.iter().map(NodeDefinition::describe).collect(),
            },
        }
    }
}
