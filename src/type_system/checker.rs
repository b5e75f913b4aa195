//! The checker that runs every tree rule before a factory is registered.
use super::error::{TreeError, TreeErrorType};
use super::rules::{compatibility, connections};
use crate::store::{FactoryBody, InstanceFactory};
use crate::tree::{ParseNode, TerminalValue};
use crate::types::ParamType;

/// Statically checks a tree-bound factory.
///
/// Checks never stop at the first problem: an author fixing a rule wants the
/// full list, so every node is visited and all errors are returned together.
pub struct TreeChecker<'a> {
    factory: &'a InstanceFactory,
    errors: Vec<TreeError>,
}

impl<'a> TreeChecker<'a> {
    pub fn new(factory: &'a InstanceFactory) -> Self {
        Self { factory, errors: Vec::new() }
    }

    /// Native factories have no tree and always pass.
    pub fn check(mut self) -> Result<(), Vec<TreeError>> {
        let FactoryBody::Tree(root) = self.factory.body() else {
            return Ok(());
        };

        self.check_output(root);
        self.check_node(root, root.slot());

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn check_output(&mut self, root: &ParseNode) {
        let output = self.factory.output();
        let Some(yielded) = compatibility::yielded_type(root, self.factory) else {
            // Reported as an unknown input by the node walk.
            return;
        };
        let ok = yielded == output.param_type() || (output.param_type() == ParamType::Replacer && yielded.is_primitive());
        if !ok {
            self.errors.push(
                TreeError::new(
                    TreeErrorType::BadOutput,
                    format!("'{}' must yield a {output} but its root yields {yielded}", self.factory.name()),
                )
                .at(root.slot()),
            );
        }
    }

    fn check_node(&mut self, node: &ParseNode, path: &str) {
        match node {
            ParseNode::Terminal(_) => {}
            ParseNode::Variable(v) => {
                if self.factory.param(&v.argument).is_none() {
                    self.errors.push(
                        TreeError::new(
                            TreeErrorType::UnknownInput,
                            format!("'{}' declares no input '{}'", self.factory.name(), v.argument),
                        )
                        .at(path),
                    );
                }
            }
            ParseNode::Internal(n) => {
                // 1. Wiring: slot names, arity, required inputs.
                for error in connections::check_slots(&n.factory, &n.children) {
                    self.errors.push(error.at(path));
                }

                // 2. Types flowing into each slot.
                for child in &n.children {
                    let child_path = format!("{path}/{}", child.slot());
                    let Some(slot) = n.factory.param(child.slot()) else { continue };
                    let Some(yielded) = compatibility::yielded_type(child, self.factory) else { continue };
                    if !compatibility::fits(child, yielded, slot.ty) {
                        let found = match child {
                            ParseNode::Terminal(t) => match &t.value {
                                TerminalValue::Constant(c) => compatibility::describe_constant(c),
                                TerminalValue::Cell(v) => format!("cell {}", v.target()),
                            },
                            _ => yielded.to_string(),
                        };
                        self.errors.push(
                            TreeError::new(
                                TreeErrorType::NodeMismatch,
                                format!("input '{}' of '{}' expects {}, found {found}", slot.name, n.factory.name(), slot.ty),
                            )
                            .at(&child_path),
                        );
                    }
                }

                // 3. Recurse.
                for child in &n.children {
                    let child_path = format!("{path}/{}", child.slot());
                    self.check_node(child, &child_path);
                }
            }
        }
    }
}
