//! Picks the backend that services a call.
//!
//! Backends are registered up front in a [`Registry`] of named
//! [`BackendModule`]s, each mapping a class name (`<TypeName>Backend`) to a
//! factory. The active module path is read from [`Settings`] on every call,
//! so reconfiguring takes effect on the next resolution.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::backend::{BackendSource, SharedBackend};
use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;
use crate::settings::{MODEL_BACKEND, Settings};

pub type BackendFactory = Arc<dyn Fn() -> SharedBackend + Send + Sync>;

/// A named set of backend classes.
#[derive(Clone)]
pub struct BackendModule {
    path: String,
    classes: HashMap<String, BackendFactory>,
}

impl BackendModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            classes: HashMap::new(),
        }
    }

    /// Registers the class servicing `kind`.
    pub fn define<F>(mut self, kind: EntityKind, factory: F) -> Self
    where
        F: Fn() -> SharedBackend + Send + Sync + 'static,
    {
        self.classes.insert(kind.backend_class(), Arc::new(factory));
        self
    }

    /// Registers one factory for every entity kind.
    pub fn define_all<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> SharedBackend + Send + Sync + 'static,
    {
        let factory: BackendFactory = Arc::new(factory);
        for kind in EntityKind::ALL {
            self.classes.insert(kind.backend_class(), Arc::clone(&factory));
        }
        self
    }

    /// Registers a single shared instance for every entity kind.
    pub fn shared(path: impl Into<String>, backend: SharedBackend) -> Self {
        Self::new(path).define_all(move || Arc::clone(&backend))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn defines(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    fn instantiate(&self, class: &str) -> Option<SharedBackend> {
        self.classes.get(class).map(|factory| factory())
    }
}

impl fmt::Debug for BackendModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<_> = self.classes.keys().collect();
        classes.sort();
        f.debug_struct("BackendModule")
            .field("path", &self.path)
            .field("classes", &classes)
            .finish()
    }
}

/// Every backend module known to the process, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    modules: HashMap<String, BackendModule>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, module: BackendModule) -> Self {
        self.modules.insert(module.path.clone(), module);
        self
    }

    pub fn module(&self, path: &str) -> Option<&BackendModule> {
        self.modules.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

/// Cheap to clone; clones share the registry and the settings.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<Registry>,
    settings: Arc<RwLock<Settings>>,
}

impl Resolver {
    pub fn new(registry: Registry, settings: Settings) -> Self {
        Self {
            registry: Arc::new(registry),
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    /// An explicit override always wins. Otherwise the class
    /// `<TypeName>Backend` is looked up in the configured module.
    pub fn resolve(
        &self,
        kind: EntityKind,
        backend: Option<&SharedBackend>,
    ) -> ModelResult<SharedBackend> {
        if let Some(backend) = backend {
            return Ok(Arc::clone(backend));
        }

        let module_path = self
            .active_module()
            .ok_or(ModelError::NotConfigured { setting: MODEL_BACKEND })?;
        let class = kind.backend_class();

        let backend = self
            .registry
            .module(&module_path)
            .and_then(|module| module.instantiate(&class))
            .ok_or_else(|| ModelError::configuration(&module_path, &class))?;

        trace!(module = %module_path, class = %class, backend = backend.name(), "resolved model backend");
        Ok(backend)
    }

    pub fn active_module(&self) -> Option<String> {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .model_backend()
            .map(str::to_string)
    }

    /// Switches the active backend module. The next resolution uses it.
    pub fn set_model_backend(&self, path: impl Into<String>) {
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(MODEL_BACKEND, path);
    }

    pub fn settings(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl BackendSource for Resolver {
    fn backend_for(&self, kind: EntityKind) -> ModelResult<SharedBackend> {
        self.resolve(kind, None)
    }
}
