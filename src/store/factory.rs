//! Instance factories: validated constructors for matchers and replacers.
use super::registry::Registry;
use crate::instance::{Arguments, Instance, InstanceKind};
use crate::tree::{interpreter, ParseNode};
use crate::types::{convert, NamedParam, Param, ParamInfo};
use crate::validation::{InstantiationError, Validator};
use std::collections::HashMap;
use tracing::debug;

/// How a factory builds its instance once the arguments are validated.
#[derive(Debug)]
pub enum FactoryBody {
    /// Resolved through the registry's native constructor table.
    Native(String),
    /// Evaluated as a parse tree with the arguments as its environment.
    Tree(ParseNode),
}

#[derive(Debug)]
pub struct InstanceFactory {
    name: String,
    description: String,
    output: InstanceKind,
    param_names: Vec<String>,
    params: HashMap<String, ParamInfo>,
    body: FactoryBody,
}

impl InstanceFactory {
    pub fn native(
        name: impl Into<String>,
        description: impl Into<String>,
        output: InstanceKind,
        params: Vec<ParamInfo>,
        native_id: impl Into<String>,
    ) -> Self {
        Self::with_body(name.into(), description.into(), output, params, FactoryBody::Native(native_id.into()))
    }

    pub fn tree(
        name: impl Into<String>,
        description: impl Into<String>,
        output: InstanceKind,
        params: Vec<ParamInfo>,
        root: ParseNode,
    ) -> Self {
        Self::with_body(name.into(), description.into(), output, params, FactoryBody::Tree(root))
    }

    fn with_body(name: String, description: String, output: InstanceKind, params: Vec<ParamInfo>, body: FactoryBody) -> Self {
        let mut param_names = Vec::with_capacity(params.len());
        let mut by_name = HashMap::with_capacity(params.len());
        for info in params {
            if !by_name.contains_key(&info.name) {
                param_names.push(info.name.clone());
            }
            by_name.insert(info.name.clone(), info);
        }
        Self { name, description, output, param_names, params: by_name, body }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn description(&self) -> &str { &self.description }
    pub fn output(&self) -> InstanceKind { self.output }
    pub fn body(&self) -> &FactoryBody { &self.body }
    pub fn param_names(&self) -> &[String] { &self.param_names }

    pub fn param(&self, name: &str) -> Option<&ParamInfo> {
        self.params.get(name)
    }

    /// Formal parameters in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &ParamInfo> + '_ {
        self.param_names.iter().filter_map(move |n| self.params.get(n))
    }

    /// Validates `arguments` and builds the instance.
    ///
    /// `optimize` lets tree-bound factories fold constant subtrees; the
    /// produced instance behaves the same either way.
    pub fn instantiate(
        &self,
        registry: &Registry,
        arguments: Vec<NamedParam>,
        optimize: bool,
    ) -> Result<Instance, InstantiationError> {
        let arguments = Validator::new(self).validate(arguments).map_err(|e| {
            debug!(factory = %self.name, error = %e, "argument validation failed");
            e
        })?;

        match &self.body {
            FactoryBody::Native(id) => self.build_native(registry, id, arguments),
            FactoryBody::Tree(root) => self.build_tree(registry, root, arguments, optimize),
        }
    }

    fn build_native(&self, registry: &Registry, id: &str, arguments: Vec<NamedParam>) -> Result<Instance, InstantiationError> {
        let constructor = registry
            .native(id)
            .ok_or_else(|| InstantiationError::construction(&self.name, format!("no native implementation '{id}'")))?;

        let rule = constructor(&Arguments::new(&self.name, &arguments)).map_err(|e| {
            InstantiationError::ParameterizedInstantiation {
                factory: self.name.clone(),
                reason: format!("native constructor '{id}' failed"),
                source: Some(Box::new(e)),
            }
        })?;

        if rule.kind() != self.output {
            return Err(InstantiationError::construction(
                &self.name,
                format!("native '{id}' built a {} but the factory declares {}", rule.kind(), self.output),
            ));
        }
        Ok(Instance::from_native(&self.name, arguments, rule))
    }

    fn build_tree(
        &self,
        registry: &Registry,
        root: &ParseNode,
        arguments: Vec<NamedParam>,
        optimize: bool,
    ) -> Result<Instance, InstantiationError> {
        let values = if optimize {
            interpreter::evaluate_optimized(root, &arguments, registry)?
        } else {
            interpreter::evaluate(root, &arguments, registry)?
        };

        if values.len() != 1 {
            return Err(InstantiationError::construction(
                &self.name,
                format!("tree produced {} values, expected exactly one", values.len()),
            ));
        }
        let Some(value) = values.into_iter().next() else {
            return Err(InstantiationError::construction(&self.name, "tree produced no value"));
        };

        let found = value.param.param_type();
        match convert::convert_to(&value.param, self.output.param_type()) {
            Some(Param::Instance(inner)) => Ok(Instance::adopt(&self.name, arguments, inner)),
            _ => Err(InstantiationError::construction(
                &self.name,
                format!("tree root yields {found}, which does not convert to {}", self.output),
            )),
        }
    }
}
