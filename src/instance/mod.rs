//! Runtime rule objects: matchers and replacers.
//!
//! Instances are only produced by [`InstanceFactory::instantiate`](crate::store::InstanceFactory::instantiate)
//! after argument validation; their constructors are crate-private.
pub mod arguments;
pub mod context;

pub use arguments::{Arguments, BuildError, NativeConstructor};
pub use context::{CellSource, EvalContext};

use crate::sheet::CellRange;
use crate::types::{EvalError, NamedParam, Param, ParamType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Body of a matcher: answers whether the evaluating cell qualifies.
pub trait MatchRule: fmt::Debug + Send + Sync {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError>;
}

/// Body of a replacer: produces a corrected value.
pub trait ReplaceRule: fmt::Debug + Send + Sync {
    fn replace(&self, ctx: &EvalContext<'_>) -> Result<Param, EvalError>;
}

/// The tag of an instance type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceKind {
    Matcher,
    Replacer,
}

impl InstanceKind {
    pub fn param_type(&self) -> ParamType {
        match self {
            InstanceKind::Matcher => ParamType::Matcher,
            InstanceKind::Replacer => ParamType::Replacer,
        }
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.param_type())
    }
}

/// What a native constructor builds.
#[derive(Debug, Clone)]
pub enum NativeRule {
    Match(Arc<dyn MatchRule>),
    Replace(Arc<dyn ReplaceRule>),
}

impl NativeRule {
    pub fn kind(&self) -> InstanceKind {
        match self {
            NativeRule::Match(_) => InstanceKind::Matcher,
            NativeRule::Replace(_) => InstanceKind::Replacer,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Matcher {
    name: String,
    arguments: Vec<NamedParam>,
    references: Vec<CellRange>,
    rule: Arc<dyn MatchRule>,
}

impl Matcher {
    pub fn name(&self) -> &str { &self.name }
    pub fn arguments(&self) -> &[NamedParam] { &self.arguments }
    pub fn references(&self) -> &[CellRange] { &self.references }

    pub fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        self.rule.matches(ctx)
    }
}

#[derive(Debug, Clone)]
pub struct Replacer {
    name: String,
    arguments: Vec<NamedParam>,
    references: Vec<CellRange>,
    rule: Arc<dyn ReplaceRule>,
}

impl Replacer {
    /// A replacer that yields `value` unchanged.
    pub(crate) fn verbatim(value: Param) -> Self {
        let arguments = vec![NamedParam::new("value", value.clone())];
        Self {
            name: "verbatim".to_string(),
            references: collect_references(&arguments, &[]),
            arguments,
            rule: Arc::new(Verbatim { value }),
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn arguments(&self) -> &[NamedParam] { &self.arguments }
    pub fn references(&self) -> &[CellRange] { &self.references }

    pub fn replace(&self, ctx: &EvalContext<'_>) -> Result<Param, EvalError> {
        self.rule.replace(ctx)
    }
}

#[derive(Debug)]
struct Verbatim {
    value: Param,
}

impl ReplaceRule for Verbatim {
    fn replace(&self, _ctx: &EvalContext<'_>) -> Result<Param, EvalError> {
        Ok(self.value.clone())
    }
}

#[derive(Debug, Clone)]
pub enum Instance {
    Matcher(Matcher),
    Replacer(Replacer),
}

impl Instance {
    pub(crate) fn from_native(name: &str, arguments: Vec<NamedParam>, rule: NativeRule) -> Self {
        let references = collect_references(&arguments, &[]);
        let name = name.to_string();
        match rule {
            NativeRule::Match(rule) => Instance::Matcher(Matcher { name, arguments, references, rule }),
            NativeRule::Replace(rule) => Instance::Replacer(Replacer { name, arguments, references, rule }),
        }
    }

    /// Re-labels a tree-produced instance as an instance of the defining factory.
    pub(crate) fn adopt(name: &str, arguments: Vec<NamedParam>, inner: Instance) -> Self {
        let references = collect_references(&arguments, inner.references());
        let name = name.to_string();
        match inner {
            Instance::Matcher(m) => Instance::Matcher(Matcher { name, arguments, references, rule: m.rule }),
            Instance::Replacer(r) => Instance::Replacer(Replacer { name, arguments, references, rule: r.rule }),
        }
    }

    pub fn kind(&self) -> InstanceKind {
        match self {
            Instance::Matcher(_) => InstanceKind::Matcher,
            Instance::Replacer(_) => InstanceKind::Replacer,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Instance::Matcher(m) => m.name(),
            Instance::Replacer(r) => r.name(),
        }
    }

    pub fn arguments(&self) -> &[NamedParam] {
        match self {
            Instance::Matcher(m) => m.arguments(),
            Instance::Replacer(r) => r.arguments(),
        }
    }

    pub fn references(&self) -> &[CellRange] {
        match self {
            Instance::Matcher(m) => m.references(),
            Instance::Replacer(r) => r.references(),
        }
    }

    pub fn into_matcher(self) -> Option<Matcher> {
        match self {
            Instance::Matcher(m) => Some(m),
            Instance::Replacer(_) => None,
        }
    }

    pub fn into_replacer(self) -> Option<Replacer> {
        match self {
            Instance::Matcher(_) => None,
            Instance::Replacer(r) => Some(r),
        }
    }
}

fn collect_references(arguments: &[NamedParam], inherited: &[CellRange]) -> Vec<CellRange> {
    let mut out: Vec<CellRange> = Vec::new();
    let found = arguments.iter().flat_map(|a| a.param.references());
    for range in inherited.iter().cloned().chain(found) {
        if !out.contains(&range) {
            out.push(range);
        }
    }
    out
}
