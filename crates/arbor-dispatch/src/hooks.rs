//! The hook chain runner

use crate::dispatcher::Dispatcher;
use crate::error::{DispatchError, Result};
use arbor_types::{event_names, ExtraInfo, HookArea, HookOutcome, HookRegistration, ModuleEvent};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

// Actions whose hook chains are rendered even when no GUI hook fired.
const GUI_ACTIONS: &[&str] = &["display", "new", "modify", "modifyconfig"];

impl Dispatcher {
    /// Runs the hook chain for `(object, action)` on behalf of a module.
    ///
    /// The acting module is `extra_info["module"]` when that module is
    /// available, the object is "module", or the name is the core
    /// pseudo-module; otherwise the ambient current-module context.
    ///
    /// GUI-area hooks render output collected per target module; API-area
    /// hooks transform `extra_info`, each one seeing the accumulated result
    /// of the hooks before it. `extra_info["tmodule"]` restricts the chain
    /// to one target module.
    pub fn call_hooks(
        &self,
        object: &str,
        action: &str,
        id: Option<Value>,
        extra_info: ExtraInfo,
        implode: bool,
    ) -> Result<HookOutcome> {
        let source = self.acting_module(object, &extra_info)?;
        let hooks = self.registry().hooks_for(&source)?;
        debug!(source = %source, object, action, count = hooks.len(), "running hook chain");

        let target_filter: Option<String> = extra_info
            .get("tmodule")
            .and_then(|v| v.as_str())
            .map(|s| s.to_owned());

        let mut extra_info = extra_info;
        let mut gui = false;
        // One entry per target module, in chain order; a later hook from the
        // same module replaces its earlier output.
        let mut output: Vec<(String, String)> = Vec::new();

        for hook in &hooks {
            if let Some(filter) = &target_filter {
                if &hook.target_module != filter {
                    continue;
                }
            }
            if !hook.matches(object, action) {
                continue;
            }

            match hook.area {
                HookArea::Gui => {
                    gui = true;
                    if !self.hook_target_ready(hook, false) {
                        continue;
                    }
                    let args = hook_args(&id, &extra_info, hook);
                    match self.exec(
                        &hook.target_module,
                        &hook.target_type,
                        &hook.target_func,
                        &args,
                        false,
                        None,
                    ) {
                        Ok(result) => {
                            let markup = value_to_markup(result);
                            output.retain(|(module, _)| module != &hook.target_module);
                            output.push((hook.target_module.clone(), markup));
                        }
                        Err(err) => {
                            warn!(target = %hook.target_module, func = %hook.target_func, %err,
                                "GUI hook failed, skipping its output");
                        }
                    }
                }
                HookArea::Api => {
                    if !self.hook_target_ready(hook, true) {
                        continue;
                    }
                    let args = hook_args(&id, &extra_info, hook);
                    let result = self.exec(
                        &hook.target_module,
                        &hook.target_type,
                        &hook.target_func,
                        &args,
                        true,
                        None,
                    )?;
                    // The next hook in the chain sees this hook's output.
                    if let Value::Object(map) = result {
                        extra_info = map;
                    } else {
                        debug!(target = %hook.target_module,
                            "API hook returned a non-object, keeping previous extra info");
                    }
                }
            }
        }

        let action_lowered = action.to_ascii_lowercase();
        if gui || GUI_ACTIONS.contains(&action_lowered.as_str()) {
            return self.finish_gui_chain(object, &action_lowered, output, implode);
        }
        self.finish_api_chain(object, &action_lowered, extra_info)
    }

    fn acting_module(&self, object: &str, extra_info: &ExtraInfo) -> Result<String> {
        if let Some(named) = extra_info.get("module").and_then(|v| v.as_str()) {
            if self.registry().available(named, false)
                || object.eq_ignore_ascii_case("module")
                || named.eq_ignore_ascii_case("core")
            {
                return Ok(named.to_owned());
            }
        }
        self.current_module().ok_or(DispatchError::NoCurrentModule)
    }

    fn hook_target_ready(&self, hook: &HookRegistration, api: bool) -> bool {
        self.registry().available(&hook.target_module, false)
            && self
                .load(&hook.target_module, &hook.target_type, api, false)
                .is_ok()
    }

    fn finish_gui_chain(
        &self,
        object: &str,
        action: &str,
        output: Vec<(String, String)>,
        implode: bool,
    ) -> Result<HookOutcome> {
        let (outcome, data) = if implode || output.is_empty() {
            let joined = output
                .iter()
                .map(|(_, markup)| markup.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            let data = Value::String(joined.clone());
            (HookOutcome::Rendered(joined), data)
        } else {
            let map: BTreeMap<String, String> = output.into_iter().collect();
            let data = json!(map);
            (HookOutcome::Fragments(map), data)
        };
        let mut event = ModuleEvent::with_data(
            event_names::POST_CALL_HOOKS_OUTPUT,
            hook_event_payload(object, action, implode),
            data,
        );
        self.bus_notify(&mut event);

        if event.notified() {
            return Ok(match event.take_data() {
                Some(Value::String(text)) => HookOutcome::Rendered(text),
                Some(Value::Object(map)) => HookOutcome::Fragments(
                    map.into_iter()
                        .map(|(module, v)| (module, value_to_markup(v)))
                        .collect(),
                ),
                other => HookOutcome::Rendered(
                    other.map(value_to_markup).unwrap_or_default(),
                ),
            });
        }
        Ok(outcome)
    }

    fn finish_api_chain(
        &self,
        object: &str,
        action: &str,
        extra_info: ExtraInfo,
    ) -> Result<HookOutcome> {
        let mut event = ModuleEvent::with_data(
            event_names::POST_CALL_HOOKS_EXTRA_INFO,
            hook_event_payload(object, action, true),
            Value::Object(extra_info.clone()),
        );
        self.bus_notify(&mut event);

        match event.take_data() {
            Some(Value::Object(map)) => Ok(HookOutcome::DataMerged(map)),
            Some(other) => {
                warn!(%object, %action, data = %other,
                    "extra-info listener set a non-object, keeping the chain result");
                Ok(HookOutcome::DataMerged(extra_info))
            }
            None => Ok(HookOutcome::DataMerged(extra_info)),
        }
    }
}

fn hook_args(id: &Option<Value>, extra_info: &ExtraInfo, hook: &HookRegistration) -> ExtraInfo {
    let mut args = ExtraInfo::new();
    args.insert(
        "objectid".to_owned(),
        id.clone().unwrap_or(Value::Null),
    );
    args.insert("extrainfo".to_owned(), Value::Object(extra_info.clone()));
    args.insert(
        "modulehook".to_owned(),
        serde_json::to_value(hook).unwrap_or(Value::Null),
    );
    args
}

fn hook_event_payload(object: &str, action: &str, implode: bool) -> ExtraInfo {
    let mut payload = ExtraInfo::new();
    payload.insert("object".to_owned(), json!(object));
    payload.insert("action".to_owned(), json!(action));
    payload.insert("implode".to_owned(), json!(implode));
    payload
}

fn value_to_markup(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
