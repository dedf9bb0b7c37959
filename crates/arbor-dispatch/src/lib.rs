//! Arbor Dispatch - resolving and invoking module functionality
//!
//! The [`Dispatcher`] is the universal invocation entry point: given a
//! (module, type, function) triple it loads the module, resolves a
//! [`ModuleHandler`], runs the pre/post execution events, and invokes the
//! target. It also drives cross-module hook chains.
//!
//! Handlers are registered up front in a lookup table; when the table
//! misses, an ordered list of [`HandlerSource`] collaborators is queried
//! (theme override, application override, module default in the classic
//! layout). There is no name-string class construction and no filesystem
//! probing in this core.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod bus;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod hooks;

// Re-exports
pub use bus::{EventBus, InProcessBus, NullBus};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Result};
pub use handler::{
    CallContext, FnHandler, HandlerSource, ModuleHandler, StaticHandlerSource, CONTRACT_API,
    CONTRACT_CONTROLLER,
};
