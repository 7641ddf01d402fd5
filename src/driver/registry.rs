//! Driver registry.
//!
//! Maps backend names to driver instances with lazy, construct-once
//! resolution.

use crate::core::{Error, Result};
use crate::driver::backends::{ConsoleDriver, FileDriver, MemoryDriver};
use crate::driver::config::AuditConfig;
use crate::driver::interface::AuditDriver;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Factory for a short-key backend.
///
/// The return type already satisfies the driver contract; this path is
/// checked at compile time.
pub type DriverFactory = Box<dyn Fn(&AuditConfig) -> Result<Arc<dyn AuditDriver>> + Send + Sync>;

/// Constructor for an externally referenced backend.
///
/// The result type is not known until runtime; the registry probes the
/// constructed object for the driver contract at resolve time.
pub type ExternalConstructor =
    Box<dyn Fn(&AuditConfig) -> Result<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// Registry resolving backend names to shared driver instances.
///
/// Resolution is two-tier: short-key factories first, then external
/// constructors registered by reference. Each name is constructed at
/// most once per registry lifetime; subsequent resolutions return the
/// cached instance.
pub struct DriverRegistry {
    /// Configuration, fixed at construction
    config: AuditConfig,
    /// Short-key factories
    factories: HashMap<String, DriverFactory>,
    /// External constructors, keyed by reference
    external: HashMap<String, ExternalConstructor>,
    /// Resolved instances; the lock is held across construction
    resolved: Mutex<HashMap<String, Arc<dyn AuditDriver>>>,
}

impl DriverRegistry {
    /// Create a registry with the built-in backends registered.
    pub fn new(config: AuditConfig) -> Self {
        let mut registry = Self {
            config,
            factories: HashMap::new(),
            external: HashMap::new(),
            resolved: Mutex::new(HashMap::new()),
        };

        registry.register("memory", |config| {
            let backend_config = config.memory.clone().unwrap_or_default();
            Ok(Arc::new(MemoryDriver::new(backend_config)) as Arc<dyn AuditDriver>)
        });

        registry.register("file", |config| {
            let backend_config = config
                .file
                .clone()
                .ok_or_else(|| Error::Storage("file backend not configured".to_string()))?;
            Ok(Arc::new(FileDriver::new(backend_config)?) as Arc<dyn AuditDriver>)
        });

        registry.register("console", |config| {
            let backend_config = config.console.clone().unwrap_or_default();
            Ok(Arc::new(ConsoleDriver::new(backend_config)) as Arc<dyn AuditDriver>)
        });

        registry
    }

    /// Register a short-key factory.
    ///
    /// Replaces any factory already registered under the name. A name
    /// that has already been resolved keeps its cached instance.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&AuditConfig) -> Result<Arc<dyn AuditDriver>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Register an external constructor under a fully-qualified reference.
    ///
    /// The constructed object must be an `Arc<dyn AuditDriver>`; anything
    /// else fails resolution with `InvalidDriverContract`.
    pub fn register_external<F>(&mut self, reference: &str, constructor: F)
    where
        F: Fn(&AuditConfig) -> Result<Box<dyn Any + Send + Sync>> + Send + Sync + 'static,
    {
        self.external.insert(reference.to_string(), Box::new(constructor));
    }

    /// Resolve a backend name to its shared driver instance.
    ///
    /// The same name always resolves to the same instance within this
    /// registry's lifetime; constructors run at most once per name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn AuditDriver>> {
        let mut resolved = self.resolved.lock().unwrap();
        if let Some(driver) = resolved.get(name) {
            return Ok(driver.clone());
        }

        let driver = if let Some(factory) = self.factories.get(name) {
            factory(&self.config).map_err(|err| Error::DriverConstructionFailed {
                name: name.to_string(),
                reason: err.to_string(),
            })?
        } else if let Some(constructor) = self.external.get(name) {
            let object = constructor(&self.config).map_err(|err| {
                Error::DriverConstructionFailed {
                    name: name.to_string(),
                    reason: err.to_string(),
                }
            })?;
            // The external path's result type is only known at runtime;
            // probe it for the contract before anything can call it.
            match object.downcast::<Arc<dyn AuditDriver>>() {
                Ok(driver) => *driver,
                Err(_) => return Err(Error::InvalidDriverContract(name.to_string())),
            }
        } else {
            return Err(Error::DriverNotFound(name.to_string()));
        };

        tracing::debug!(backend = name, kind = driver.kind(), "audit driver resolved");
        resolved.insert(name.to_string(), driver.clone());
        Ok(driver)
    }

    /// Resolve the configured default backend.
    pub fn resolve_default(&self) -> Result<Arc<dyn AuditDriver>> {
        self.resolve(&self.config.default_backend)
    }

    /// The configured default backend name.
    pub fn default_backend(&self) -> &str {
        &self.config.default_backend
    }

    /// Whether a name is resolvable (registered factory or constructor).
    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name) || self.external.contains_key(name)
    }

    /// The configuration this registry was built with.
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }
}
