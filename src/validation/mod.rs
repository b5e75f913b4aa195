//! Argument validation for instance factories.
//!
//! Every instance is built through this pipeline; a factory never hands
//! unchecked arguments to its implementation.
pub use self::error::InstantiationError;
pub use self::validator::Validator;

mod error;
mod validator;
mod rules {
    pub mod arrays;
    pub mod names;
    pub mod requirements;
    pub mod types;
}
