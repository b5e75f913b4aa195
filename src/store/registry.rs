use super::definition::FactoryDefinition;
use super::error::RegistryError;
use super::factory::{FactoryBody, InstanceFactory};
use crate::instance::{Arguments, BuildError, Instance, NativeConstructor, NativeRule};
use crate::type_system::TreeChecker;
use crate::types::NamedParam;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// The lookup table for native implementations and named factories.
///
/// Owned by the session and passed to whatever needs lookup; there is no
/// process-wide instance.
#[derive(Clone)]
pub struct Registry {
    natives: HashMap<String, NativeConstructor>,
    factories: IndexMap<String, Arc<InstanceFactory>>,
    optimize: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self { natives: HashMap::new(), factories: IndexMap::new(), optimize: true }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut natives: Vec<&String> = self.natives.keys().collect();
        natives.sort();
        f.debug_struct("Registry")
            .field("natives", &natives)
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("optimize", &self.optimize)
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    /// A registry preloaded with the built-in rule library.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::install(&mut registry);
        registry
    }

    pub fn count(&self) -> usize { self.factories.len() }
    pub fn optimize(&self) -> bool { self.optimize }

    /// Whether tree-bound factories fold constant subtrees.
    pub fn set_optimize(&mut self, optimize: bool) {
        self.optimize = optimize;
    }

    pub fn register_native<F>(&mut self, id: impl Into<String>, constructor: F)
    where
        F: Fn(&Arguments<'_>) -> Result<NativeRule, BuildError> + Send + Sync + 'static,
    {
        self.natives.insert(id.into(), Arc::new(constructor));
    }

    pub fn native(&self, id: &str) -> Option<&NativeConstructor> {
        self.natives.get(id)
    }

    /// Registers a factory after checking it can be built.
    ///
    /// Native factories must name a registered implementation; tree factories
    /// must pass the static tree checker.
    pub fn register_factory(&mut self, factory: InstanceFactory) -> Result<Arc<InstanceFactory>, RegistryError> {
        let name = factory.name().to_string();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::DuplicateFactory(name));
        }

        match factory.body() {
            FactoryBody::Native(id) if !self.natives.contains_key(id) => {
                return Err(RegistryError::UnknownNative { factory: name, id: id.clone() });
            }
            FactoryBody::Native(_) => {}
            FactoryBody::Tree(_) => {
                if let Err(errors) = TreeChecker::new(&factory).check() {
                    warn!(factory = %name, errors = errors.len(), "rejected malformed rule tree");
                    return Err(RegistryError::MalformedTree { factory: name, errors });
                }
            }
        }

        debug!(factory = %name, output = %factory.output(), "registered factory");
        Ok(self.insert(factory))
    }

    /// Inserts without checks; used for the built-in library.
    pub(crate) fn insert(&mut self, factory: InstanceFactory) -> Arc<InstanceFactory> {
        let factory = Arc::new(factory);
        self.factories.insert(factory.name().to_string(), factory.clone());
        factory
    }

    pub fn factory(&self, name: &str) -> Option<Arc<InstanceFactory>> {
        self.factories.get(name).cloned()
    }

    /// Factories in registration order.
    pub fn factories(&self) -> impl Iterator<Item = &Arc<InstanceFactory>> + '_ {
        self.factories.values()
    }

    pub fn instantiate(&self, name: &str, arguments: Vec<NamedParam>) -> Result<Instance, RegistryError> {
        let factory = self.factories.get(name).ok_or_else(|| RegistryError::UnknownFactory(name.to_string()))?;
        Ok(factory.instantiate(self, arguments, self.optimize)?)
    }

    /// First free name of the form `base`, `base_1`, `base_2`, ...
    pub fn unique_name(&self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut counter = 1;
        while self.factories.contains_key(&candidate) {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }
        candidate
    }

    /// Loads a JSON array of factory definitions.
    ///
    /// Definitions are resolved in order, so a tree may use any factory
    /// registered before it, including earlier entries of the same array.
    /// Loading stops at the first failing definition; the ones before it stay registered.
    pub fn load_definitions(&mut self, json: &str) -> Result<Vec<Arc<InstanceFactory>>, RegistryError> {
        let definitions: Vec<FactoryDefinition> = serde_json::from_str(json)?;
        let mut loaded = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let factory = definition.resolve(self)?;
            loaded.push(self.register_factory(factory)?);
        }
        debug!(count = loaded.len(), "loaded rule definitions");
        Ok(loaded)
    }

    pub fn load_definitions_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<Arc<InstanceFactory>>, RegistryError> {
        let json = std::fs::read_to_string(path)?;
        self.load_definitions(&json)
    }
}
