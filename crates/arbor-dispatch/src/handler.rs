//! Module handlers and handler sources
//!
//! A handler is the invokable surface a module registers for one
//! (type, api) slot. Handlers name the functions they dispatch; a function
//! a handler does not declare is simply not there, which closes the
//! classic hole of reaching inherited methods the module never meant to
//! expose.

use crate::error::{DispatchError, Result};
use arbor_types::ExtraInfo;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Contract of user-facing handlers.
pub const CONTRACT_CONTROLLER: &str = "controller";
/// Contract of programmatic API handlers.
pub const CONTRACT_API: &str = "api";

/// Call-site context passed to a handler invocation.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub module: &'a str,
    pub handler_type: &'a str,
    pub func: &'a str,
    pub api: bool,
}

/// The invokable surface of one module (type, api) slot.
pub trait ModuleHandler: Send + Sync {
    /// Handler family marker, checked against the caller's expected
    /// contract ([`CONTRACT_CONTROLLER`], [`CONTRACT_API`], or custom).
    fn contract(&self) -> &str;

    /// Whether `func` is part of this handler's dispatch surface.
    fn responds_to(&self, func: &str) -> bool;

    fn invoke(&self, ctx: &CallContext<'_>, args: &ExtraInfo) -> Result<Value>;
}

/// Handler built from a closure and an explicit function list.
pub struct FnHandler<F> {
    contract: String,
    funcs: Vec<String>,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&CallContext<'_>, &ExtraInfo) -> Result<Value> + Send + Sync,
{
    pub fn new(contract: &str, funcs: &[&str], f: F) -> Self {
        FnHandler {
            contract: contract.to_owned(),
            funcs: funcs.iter().map(|s| (*s).to_owned()).collect(),
            f,
        }
    }
}

impl<F> ModuleHandler for FnHandler<F>
where
    F: Fn(&CallContext<'_>, &ExtraInfo) -> Result<Value> + Send + Sync,
{
    fn contract(&self) -> &str {
        &self.contract
    }

    fn responds_to(&self, func: &str) -> bool {
        self.funcs.iter().any(|f| f == func)
    }

    fn invoke(&self, ctx: &CallContext<'_>, args: &ExtraInfo) -> Result<Value> {
        if !self.responds_to(ctx.func) {
            return Err(DispatchError::NotFound {
                module: ctx.module.to_owned(),
                func: ctx.func.to_owned(),
            });
        }
        (self.f)(ctx, args)
    }
}

/// Key of one handler slot: lowercased module, lowercased type, api flag.
pub(crate) type HandlerKey = (String, String, bool);

pub(crate) fn handler_key(module: &str, handler_type: &str, api: bool) -> HandlerKey {
    (
        module.to_ascii_lowercase(),
        handler_type.to_ascii_lowercase(),
        api,
    )
}

/// A fallback provider of handlers, queried when the primary table misses.
///
/// The classic deployment layers three of these: theme overrides,
/// application-level overrides, and the module's own default functions,
/// in that order.
pub trait HandlerSource: Send + Sync {
    /// Name used in logs when this source resolves a call.
    fn describe(&self) -> &str;

    /// Whether this source carries the module's handler slot at all,
    /// before any function is named.
    fn provides(&self, module: &str, handler_type: &str, api: bool) -> bool;

    fn resolve(
        &self,
        module: &str,
        handler_type: &str,
        api: bool,
        func: &str,
    ) -> Option<Arc<dyn ModuleHandler>>;
}

/// Handler source backed by a fixed table.
pub struct StaticHandlerSource {
    name: String,
    handlers: DashMap<HandlerKey, Arc<dyn ModuleHandler>>,
}

impl StaticHandlerSource {
    pub fn new(name: &str) -> Self {
        StaticHandlerSource {
            name: name.to_owned(),
            handlers: DashMap::new(),
        }
    }

    pub fn insert(
        &self,
        module: &str,
        handler_type: &str,
        api: bool,
        handler: Arc<dyn ModuleHandler>,
    ) {
        self.handlers
            .insert(handler_key(module, handler_type, api), handler);
    }
}

impl HandlerSource for StaticHandlerSource {
    fn describe(&self) -> &str {
        &self.name
    }

    fn provides(&self, module: &str, handler_type: &str, api: bool) -> bool {
        self.handlers
            .contains_key(&handler_key(module, handler_type, api))
    }

    fn resolve(
        &self,
        module: &str,
        handler_type: &str,
        api: bool,
        func: &str,
    ) -> Option<Arc<dyn ModuleHandler>> {
        self.handlers
            .get(&handler_key(module, handler_type, api))
            .filter(|handler| handler.responds_to(func))
            .map(|handler| handler.clone())
    }
}
