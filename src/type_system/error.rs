//! Defines the error types for the type system module.
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeErrorType {
    /// A variable node refers to an argument the factory does not declare.
    UnknownInput,
    /// A child is wired to a slot its parent lacks, or too often.
    InvalidNodeConnection,
    /// A child's value type does not fit the slot it feeds.
    NodeMismatch,
    /// The root does not yield the factory's instance type.
    BadOutput,
    /// A required slot has no child.
    InputNotConnected,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct TreeError {
    /// Slot names from the root down to the offending node.
    pub path: String,
    pub error_type: TreeErrorType,
    pub message: String,
}

impl TreeError {
    pub fn new(error_type: TreeErrorType, message: impl Into<String>) -> Self {
        Self { path: String::new(), error_type, message: message.into() }
    }

    pub fn at(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }
}
