//! Hook chain scenarios: GUI rendering and API accumulation.

use arbor_dispatch::{
    DispatchError, Dispatcher, FnHandler, InProcessBus, CONTRACT_API, CONTRACT_CONTROLLER,
};
use arbor_registry::{
    InMemoryHookStore, InMemoryModuleStore, InMemoryVarStore, ModuleRegistry, RegistryConfig,
};
use arbor_types::{
    event_names, CapabilityMap, ExtraInfo, HookArea, HookOutcome, HookRegistration, ModuleId,
    ModuleKind, ModuleRecord, ModuleState,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn record(id: u32, name: &str, state: ModuleState) -> ModuleRecord {
    ModuleRecord {
        id: ModuleId(id),
        name: name.to_owned(),
        display_name: name.to_owned(),
        url_alias: String::new(),
        directory: name.to_lowercase(),
        kind: ModuleKind::Module,
        state,
        capabilities: CapabilityMap::new(),
    }
}

fn hook(
    seq: u32,
    object: &str,
    action: &str,
    area: HookArea,
    target: &str,
    target_type: &str,
    func: &str,
) -> HookRegistration {
    HookRegistration {
        object: object.to_owned(),
        action: action.to_owned(),
        area,
        source_module: "Groups".to_owned(),
        target_module: target.to_owned(),
        target_type: target_type.to_owned(),
        target_func: func.to_owned(),
        sequence: seq,
    }
}

fn setup() -> (Dispatcher, Arc<InMemoryHookStore>, Arc<InProcessBus>) {
    let modules = Arc::new(InMemoryModuleStore::new());
    modules.insert(record(1, "Groups", ModuleState::Active));
    modules.insert(record(2, "Comments", ModuleState::Active));
    modules.insert(record(3, "Ratings", ModuleState::Active));
    modules.insert(record(4, "EmailNotify", ModuleState::Active));
    modules.insert(record(5, "Audit", ModuleState::Active));
    modules.insert(record(6, "Broken", ModuleState::Inactive));

    let hooks = Arc::new(InMemoryHookStore::new());
    let registry = Arc::new(ModuleRegistry::new(
        RegistryConfig::default(),
        modules,
        Arc::new(InMemoryVarStore::new()),
        hooks.clone(),
    ));
    let bus = Arc::new(InProcessBus::new());
    let dispatcher = Dispatcher::new(registry, bus.clone());

    // GUI targets render a snippet naming themselves and the object id.
    for name in ["Comments", "Ratings"] {
        dispatcher.register_handler(
            name,
            "user",
            false,
            Arc::new(FnHandler::new(CONTRACT_CONTROLLER, &["view"], {
                let name = name.to_owned();
                move |_ctx, args| {
                    let id = args.get("objectid").cloned().unwrap_or(Value::Null);
                    Ok(json!(format!("<div>{name}:{id}</div>")))
                }
            })),
        );
    }

    // API targets transform the extra-info payload.
    dispatcher.register_handler(
        "EmailNotify",
        "admin",
        true,
        Arc::new(FnHandler::new(CONTRACT_API, &["update"], |_ctx, args| {
            let mut info = args
                .get("extrainfo")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default();
            info.insert("notified".to_owned(), json!(true));
            Ok(Value::Object(info))
        })),
    );
    dispatcher.register_handler(
        "Audit",
        "admin",
        true,
        Arc::new(FnHandler::new(CONTRACT_API, &["update"], |_ctx, args| {
            let mut info = args
                .get("extrainfo")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default();
            info.insert("audited".to_owned(), json!(true));
            Ok(Value::Object(info))
        })),
    );

    (dispatcher, hooks, bus)
}

fn groups_extra_info() -> ExtraInfo {
    let mut info = ExtraInfo::new();
    info.insert("module".to_owned(), json!("Groups"));
    info
}

#[test]
fn gui_chain_renders_in_sequence_order() {
    let (dispatcher, hooks, _bus) = setup();
    use arbor_registry::HookStore;
    hooks
        .insert_hook(hook(2, "item", "display", HookArea::Gui, "Ratings", "user", "view"))
        .unwrap();
    hooks
        .insert_hook(hook(1, "item", "display", HookArea::Gui, "Comments", "user", "view"))
        .unwrap();

    let outcome = dispatcher
        .call_hooks("item", "display", Some(json!(42)), groups_extra_info(), true)
        .unwrap();
    assert_eq!(
        outcome,
        HookOutcome::Rendered("<div>Comments:42</div>\n<div>Ratings:42</div>".to_owned())
    );
}

#[test]
fn gui_chain_keeps_fragments_when_not_imploding() {
    let (dispatcher, hooks, _bus) = setup();
    use arbor_registry::HookStore;
    hooks
        .insert_hook(hook(1, "item", "display", HookArea::Gui, "Comments", "user", "view"))
        .unwrap();
    hooks
        .insert_hook(hook(2, "item", "display", HookArea::Gui, "Ratings", "user", "view"))
        .unwrap();

    let outcome = dispatcher
        .call_hooks("item", "display", Some(json!(7)), groups_extra_info(), false)
        .unwrap();
    let HookOutcome::Fragments(fragments) = outcome else {
        panic!("expected fragments");
    };
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments["Comments"], "<div>Comments:7</div>");
    assert_eq!(fragments["Ratings"], "<div>Ratings:7</div>");
}

#[test]
fn empty_gui_chain_renders_an_empty_string_even_without_implode() {
    let (dispatcher, _hooks, _bus) = setup();
    let outcome = dispatcher
        .call_hooks("item", "display", None, groups_extra_info(), false)
        .unwrap();
    assert_eq!(outcome, HookOutcome::Rendered(String::new()));
}

#[test]
fn api_chain_feeds_each_hook_the_previous_output() {
    let (dispatcher, hooks, _bus) = setup();
    use arbor_registry::HookStore;
    hooks
        .insert_hook(hook(1, "module", "updateconfig", HookArea::Api, "EmailNotify", "admin", "update"))
        .unwrap();
    hooks
        .insert_hook(hook(2, "module", "updateconfig", HookArea::Api, "Audit", "admin", "update"))
        .unwrap();

    let outcome = dispatcher
        .call_hooks("module", "updateconfig", None, groups_extra_info(), true)
        .unwrap();
    let HookOutcome::DataMerged(info) = outcome else {
        panic!("expected merged data");
    };

    // The second hook saw the first hook's output and built on it.
    assert_eq!(info.get("notified"), Some(&json!(true)));
    assert_eq!(info.get("audited"), Some(&json!(true)));
    assert_eq!(info.get("module"), Some(&json!("Groups")));
}

#[test]
fn target_module_filter_restricts_the_chain() {
    let (dispatcher, hooks, _bus) = setup();
    use arbor_registry::HookStore;
    hooks
        .insert_hook(hook(1, "item", "display", HookArea::Gui, "Comments", "user", "view"))
        .unwrap();
    hooks
        .insert_hook(hook(2, "item", "display", HookArea::Gui, "Ratings", "user", "view"))
        .unwrap();

    let mut info = groups_extra_info();
    info.insert("tmodule".to_owned(), json!("Ratings"));
    let outcome = dispatcher
        .call_hooks("item", "display", Some(json!(1)), info, true)
        .unwrap();
    assert_eq!(outcome, HookOutcome::Rendered("<div>Ratings:1</div>".to_owned()));
}

#[test]
fn unavailable_targets_are_skipped() {
    let (dispatcher, hooks, _bus) = setup();
    use arbor_registry::HookStore;
    hooks
        .insert_hook(hook(1, "item", "display", HookArea::Gui, "Broken", "user", "view"))
        .unwrap();
    hooks
        .insert_hook(hook(2, "item", "display", HookArea::Gui, "Comments", "user", "view"))
        .unwrap();

    let outcome = dispatcher
        .call_hooks("item", "display", Some(json!(3)), groups_extra_info(), true)
        .unwrap();
    assert_eq!(outcome, HookOutcome::Rendered("<div>Comments:3</div>".to_owned()));
}

#[test]
fn acting_module_falls_back_to_the_current_module_context() {
    let (dispatcher, hooks, _bus) = setup();
    use arbor_registry::HookStore;
    hooks
        .insert_hook(hook(1, "item", "display", HookArea::Gui, "Comments", "user", "view"))
        .unwrap();

    // No module named in the call and no ambient context: an explicit error.
    assert!(matches!(
        dispatcher.call_hooks("item", "display", None, ExtraInfo::new(), true),
        Err(DispatchError::NoCurrentModule)
    ));

    dispatcher.set_current_module(Some("Groups"));
    let outcome = dispatcher
        .call_hooks("item", "display", Some(json!(9)), ExtraInfo::new(), true)
        .unwrap();
    assert_eq!(outcome, HookOutcome::Rendered("<div>Comments:9</div>".to_owned()));
}

#[test]
fn output_event_listener_can_override_the_rendered_result() {
    let (dispatcher, hooks, bus) = setup();
    use arbor_registry::HookStore;
    hooks
        .insert_hook(hook(1, "item", "display", HookArea::Gui, "Comments", "user", "view"))
        .unwrap();

    bus.subscribe(event_names::POST_CALL_HOOKS_OUTPUT, |event| {
        event.set_data(json!("replaced output"));
        event.mark_notified();
    });

    let outcome = dispatcher
        .call_hooks("item", "display", Some(json!(1)), groups_extra_info(), true)
        .unwrap();
    assert_eq!(outcome, HookOutcome::Rendered("replaced output".to_owned()));
}

#[test]
fn non_object_listener_data_keeps_the_accumulated_extra_info() {
    let (dispatcher, _hooks, bus) = setup();
    bus.subscribe(event_names::POST_CALL_HOOKS_EXTRA_INFO, |event| {
        event.set_data(json!("not an object"));
        event.mark_notified();
    });

    let mut info = groups_extra_info();
    info.insert("uid".to_owned(), json!(12));
    let outcome = dispatcher
        .call_hooks("item", "delete", Some(json!(12)), info.clone(), true)
        .unwrap();
    assert_eq!(outcome, HookOutcome::DataMerged(info));
}

#[test]
fn non_gui_action_without_hooks_passes_extra_info_through() {
    let (dispatcher, _hooks, _bus) = setup();
    let mut info = groups_extra_info();
    info.insert("uid".to_owned(), json!(12));

    let outcome = dispatcher
        .call_hooks("item", "delete", Some(json!(12)), info.clone(), true)
        .unwrap();
    assert_eq!(outcome, HookOutcome::DataMerged(info));
}
