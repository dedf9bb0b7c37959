//! The dispatcher: loading modules and running their functions

use crate::bus::EventBus;
use crate::error::{DispatchError, Result};
use crate::handler::{handler_key, CallContext, HandlerKey, HandlerSource, ModuleHandler};
use arbor_registry::{ModuleRegistry, RegistryError};
use arbor_types::{event_names, valid_module_name, ExtraInfo, ModuleEvent};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Universal invocation entry point.
///
/// Owns the handler table, the fallback source chain, the loaded-module
/// flags and the ambient current-module context. Everything else (module
/// metadata, variables, hook registrations) lives in the registry.
pub struct Dispatcher {
    registry: Arc<ModuleRegistry>,
    bus: Arc<dyn EventBus>,

    handlers: DashMap<HandlerKey, Arc<dyn ModuleHandler>>,
    sources: RwLock<Vec<Arc<dyn HandlerSource>>>,

    // Handlers resolved through the source chain, per full call shape
    resolved: DashMap<(String, String, bool, String), Arc<dyn ModuleHandler>>,

    loaded: DashMap<HandlerKey, ()>,

    current_module: RwLock<Option<String>>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ModuleRegistry>, bus: Arc<dyn EventBus>) -> Self {
        Dispatcher {
            registry,
            bus,
            handlers: DashMap::new(),
            sources: RwLock::new(Vec::new()),
            resolved: DashMap::new(),
            loaded: DashMap::new(),
            current_module: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub(crate) fn bus_notify(&self, event: &mut ModuleEvent) {
        self.bus.notify(event);
    }

    /// Registers the handler for one (module, type, api) slot. Called at
    /// module-registration time; replaces any previous handler for the slot.
    pub fn register_handler(
        &self,
        module: &str,
        handler_type: &str,
        api: bool,
        handler: Arc<dyn ModuleHandler>,
    ) {
        self.handlers
            .insert(handler_key(module, handler_type, api), handler);
    }

    /// Appends a fallback handler source. Sources are queried in insertion
    /// order when the primary table misses.
    pub fn add_source(&self, source: Arc<dyn HandlerSource>) {
        self.sources.write().push(source);
    }

    /// Sets the ambient acting-module context used by hook chains when the
    /// caller names no module.
    pub fn set_current_module(&self, module: Option<&str>) {
        *self.current_module.write() = module.map(|m| m.to_owned());
    }

    pub fn current_module(&self) -> Option<String> {
        self.current_module.read().clone()
    }

    /// Loads a module for one handler type. Idempotent per
    /// (module, type, api); fires `module.post_load` exactly once per key.
    ///
    /// `force` bypasses the availability check. The module-administration
    /// module always loads so the site stays manageable mid-upgrade.
    pub fn load(&self, module: &str, handler_type: &str, api: bool, force: bool) -> Result<()> {
        if !valid_module_name(module) {
            return Err(DispatchError::InvalidName(module.to_owned()));
        }
        let key = handler_key(module, handler_type, api);
        if self.loaded.contains_key(&key) {
            return Ok(());
        }

        let available = self.registry.available(module, force);
        if !force && !available && !module.eq_ignore_ascii_case("modules") {
            return Err(DispatchError::Unavailable(module.to_owned()));
        }

        let info = self
            .registry
            .info_from_name(module)
            .map_err(|err| match err {
                RegistryError::ModuleNotFound(name) => DispatchError::UnknownModule(name),
                other => other.into(),
            })?;

        self.loaded.insert(key, ());
        debug!(module, handler_type, api, "module loaded");

        let mut payload = ExtraInfo::new();
        payload.insert("module".to_owned(), json!(info.name));
        payload.insert("type".to_owned(), json!(handler_type));
        payload.insert("api".to_owned(), json!(api));
        payload.insert("force".to_owned(), json!(force));
        let mut event = ModuleEvent::new(event_names::POST_LOAD, payload);
        self.bus.notify(&mut event);

        Ok(())
    }

    /// Loads every available module for its user-facing type.
    pub fn load_all(&self) -> Result<()> {
        for record in self.registry.all_modules()? {
            if self.registry.available(&record.name, false) {
                self.load(&record.name, "user", false, false)?;
            }
        }
        Ok(())
    }

    /// Whether a handler slot exists for the module's type, in the primary
    /// table or any fallback source. Answers "does this module have an
    /// admin controller / a user API" without naming a function.
    pub fn has_handler(&self, module: &str, handler_type: &str, api: bool) -> bool {
        if self.handlers.contains_key(&handler_key(module, handler_type, api)) {
            return true;
        }
        self.sources
            .read()
            .iter()
            .any(|source| source.provides(module, handler_type, api))
    }

    fn resolve_handler(
        &self,
        module: &str,
        handler_type: &str,
        api: bool,
        func: &str,
    ) -> Option<Arc<dyn ModuleHandler>> {
        let key = handler_key(module, handler_type, api);
        if let Some(handler) = self.handlers.get(&key) {
            if handler.responds_to(func) {
                return Some(handler.clone());
            }
        }

        let resolved_key = (key.0, key.1, api, func.to_owned());
        if let Some(handler) = self.resolved.get(&resolved_key) {
            return Some(handler.clone());
        }
        for source in self.sources.read().iter() {
            if let Some(handler) = source.resolve(module, handler_type, api, func) {
                debug!(
                    module,
                    handler_type,
                    func,
                    source = source.describe(),
                    "handler resolved through fallback source"
                );
                self.resolved.insert(resolved_key, handler.clone());
                return Some(handler);
            }
        }
        None
    }

    /// Runs a module function.
    ///
    /// Loads the module, resolves the handler (table first, then the
    /// fallback sources), fires `module.pre_execute` (a notified listener
    /// short-circuits with its data), invokes the target, fires
    /// `module.post_execute` (listeners may replace the result), and
    /// returns the final payload. When nothing resolves,
    /// `module.type_not_found` gives listeners a last chance to supply a
    /// value before `NotFound` comes back.
    pub fn exec(
        &self,
        module: &str,
        handler_type: &str,
        func: &str,
        args: &ExtraInfo,
        api: bool,
        expect_contract: Option<&str>,
    ) -> Result<Value> {
        if !valid_module_name(module) {
            return Err(DispatchError::InvalidName(module.to_owned()));
        }
        let info = self
            .registry
            .info_from_name(module)
            .map_err(|err| match err {
                RegistryError::ModuleNotFound(name) => DispatchError::UnknownModule(name),
                other => other.into(),
            })?;

        self.load(module, handler_type, api, false)?;

        let mut payload = ExtraInfo::new();
        payload.insert("module".to_owned(), json!(info.name));
        payload.insert("type".to_owned(), json!(handler_type));
        payload.insert("func".to_owned(), json!(func));
        payload.insert("api".to_owned(), json!(api));

        let Some(handler) = self.resolve_handler(module, handler_type, api, func) else {
            let mut event = ModuleEvent::new(event_names::TYPE_NOT_FOUND, payload);
            self.bus.notify_until(&mut event);
            if event.notified() {
                return Ok(event.take_data().unwrap_or(Value::Null));
            }
            return Err(DispatchError::NotFound {
                module: module.to_owned(),
                func: func.to_owned(),
            });
        };

        if let Some(expected) = expect_contract {
            if handler.contract() != expected {
                return Err(DispatchError::ContractViolation {
                    module: module.to_owned(),
                    expected: expected.to_owned(),
                    actual: handler.contract().to_owned(),
                });
            }
        }

        let mut pre = ModuleEvent::new(event_names::PRE_EXECUTE, payload.clone());
        self.bus.notify(&mut pre);
        if pre.notified() {
            debug!(module, func, "pre-execute listener short-circuited the call");
            return Ok(pre.take_data().unwrap_or(Value::Null));
        }

        let ctx = CallContext {
            module,
            handler_type,
            func,
            api,
        };
        let result = handler.invoke(&ctx, args)?;

        let mut post = ModuleEvent::with_data(event_names::POST_EXECUTE, payload, result);
        self.bus.notify(&mut post);
        Ok(post.take_data().unwrap_or(Value::Null))
    }

    /// Runs a user-facing module function. Empty type defaults to "user",
    /// empty func to "main".
    pub fn func(&self, module: &str, handler_type: &str, func: &str, args: &ExtraInfo) -> Result<Value> {
        let handler_type = if handler_type.is_empty() { "user" } else { handler_type };
        let func = if func.is_empty() { "main" } else { func };
        self.exec(module, handler_type, func, args, false, None)
    }

    /// Runs a programmatic API function. Empty type defaults to "user",
    /// empty func to "main".
    pub fn api_func(&self, module: &str, handler_type: &str, func: &str, args: &ExtraInfo) -> Result<Value> {
        let handler_type = if handler_type.is_empty() { "user" } else { handler_type };
        let func = if func.is_empty() { "main" } else { func };
        self.exec(module, handler_type, func, args, true, None)
    }
}
