//! The type and parameter model shared by every rule.
pub mod error;
pub mod info;
pub mod param;
pub mod variable;

pub use error::{DereferenceError, EvalError};
pub use info::ParamInfo;
pub use param::{convert, Constant, NamedParam, Param, ParamType};
pub use variable::{SimpleVariable, SpreadsheetVariable, Variable};
