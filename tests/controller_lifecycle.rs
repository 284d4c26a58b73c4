use script_host::bindings::ModuleBridge;
use script_host::config::{ExecutorFactory, HostConfig};
use script_host::core::{HostError, LifecycleError, RuntimeResult};
use script_host::platform::{BackRequestedArgs, HeadlessHost, HostEventSource, KeyEvent, RootView, VirtualKey};
use script_host::runtime::{
    BridgedRuntimeBuilder, ControllerOptions, DevAction, HostState, RuntimeHostController, RuntimeManager,
    ScriptExecutor,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type CallLog = Arc<Mutex<Vec<String>>>;

/// 只记录全局函数调用的执行器
struct StubExecutor {
    log: CallLog,
}

impl ScriptExecutor for StubExecutor {
    fn install_bridge(&mut self, _bridge: Arc<ModuleBridge>) -> RuntimeResult<()> {
        Ok(())
    }

    fn run_script(&mut self, _source: &str, _source_url: &str) -> RuntimeResult<()> {
        Ok(())
    }

    fn call_global(&mut self, function: &str, args: &[Value]) -> RuntimeResult<Option<Value>> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", function, Value::Array(args.to_vec())));
        Ok(None)
    }

    fn run_pending_jobs(&mut self) -> RuntimeResult<usize> {
        Ok(0)
    }
}

fn stub_factory(log: &CallLog) -> ExecutorFactory {
    let log = Arc::clone(log);
    Arc::new(move || Ok(Box::new(StubExecutor { log: Arc::clone(&log) }) as Box<dyn ScriptExecutor>))
}

type Controller = RuntimeHostController<Option<String>, BridgedRuntimeBuilder>;

fn setup(developer_mode: bool) -> (Controller, HeadlessHost, CallLog) {
    let log = CallLog::default();
    let host = HeadlessHost::new();
    let mut config = HostConfig::new("Playground");
    config.runtime.developer_mode_enabled = developer_mode;

    let options = ControllerOptions {
        executor_factory: Some(stub_factory(&log)),
        ..Default::default()
    };
    let controller = RuntimeHostController::with_options(
        config,
        BridgedRuntimeBuilder::new(),
        Box::new(host.clone()),
        host.root_view_factory(),
        options,
    )
    .unwrap();
    (controller, host, log)
}

fn run_application_calls(log: &CallLog) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|e| e.starts_with("__runApplication"))
        .cloned()
        .collect()
}

#[test]
fn test_create_signals_context_and_exposes_model() {
    let (mut controller, _host, _log) = setup(false);
    let mut signal = controller.context_initialized().unwrap();
    assert!(controller.context_initialized().is_none());
    assert!(controller.native_object_model().is_none());

    controller.on_create(None, None).unwrap();

    let context = signal.try_take().expect("context initialized during on_create");
    assert_eq!(context.lifecycle_state(), script_host::bindings::LifecycleState::BeforeCreate);

    let model = controller.native_object_model().unwrap();
    assert_eq!(model.data(), None);
    assert!(model.set_data(Some("value".into())));
    assert_eq!(controller.process_events().unwrap(), 1);
}

#[test]
fn test_remote_debugging_launch_argument() {
    let (mut controller, _host, _log) = setup(true);
    controller.on_create(Some("foo,bar,remoteDebugging,TRUE"), None).unwrap();
    assert!(controller.manager().unwrap().remote_debugging_enabled());

    let (mut controller, _host, _log) = setup(true);
    controller.on_create(Some("foo,bar"), None).unwrap();
    assert!(!controller.manager().unwrap().remote_debugging_enabled());
}

#[test]
fn test_back_navigation_is_marked_handled() {
    let (mut controller, _host, log) = setup(false);
    controller.on_create(None, None).unwrap();

    let mut args = BackRequestedArgs::default();
    controller.on_back_requested(&mut args).unwrap();
    assert!(args.handled);
    assert!(log
        .lock()
        .unwrap()
        .iter()
        .any(|e| e.starts_with("__onHardwareBackPress")));
}

#[test]
fn test_dev_menu_chord_in_developer_mode() {
    let (mut controller, _host, _log) = setup(true);
    controller.on_create(None, None).unwrap();

    controller.on_key_event(&KeyEvent::down(VirtualKey::Shift)).unwrap();
    let action = controller.on_key_event(&KeyEvent::down(VirtualKey::F10)).unwrap();
    assert_eq!(action, Some(DevAction::ShowDevMenu));
    assert_eq!(controller.manager().unwrap().dev_menu_requests(), 1);
}

#[test]
fn test_ctrl_r_reloads_within_generation() {
    let (mut controller, _host, log) = setup(true);
    controller.on_create(None, None).unwrap();

    // 0x11 = Control, 0x52 = R; 2 = KeyDown, 3 = KeyUp
    controller.on_raw_key_event(0x11, 2).unwrap();
    controller.on_raw_key_event(0x52, 2).unwrap();
    let action = controller.on_raw_key_event(0x52, 3).unwrap();
    assert_eq!(action, Some(DevAction::ForceReload));

    assert_eq!(controller.generation().value(), 1);
    assert_eq!(run_application_calls(&log).len(), 2);
}

#[tokio::test]
async fn test_reload_round_trip() {
    let (mut controller, host, log) = setup(false);
    controller
        .on_create(None, Some(json!({ "initial": true })))
        .unwrap();

    let first_model = Arc::downgrade(&controller.native_object_model().unwrap());
    let first_generation = controller.generation();

    controller.on_new_bundle().await.unwrap();

    assert_eq!(controller.state(), HostState::Running);
    assert_eq!(controller.generation(), first_generation.next());
    assert!(first_model.upgrade().is_none(), "previous generation's model must be released");
    assert!(controller.native_object_model().is_some());

    assert_eq!(host.views().len(), 2);
    assert!(!host.views()[0].is_attached());
    assert_eq!(host.views()[1].started_components(), vec!["Playground"]);
    assert_eq!(host.active_subscriptions(HostEventSource::KeyEvents), 1);
    assert_eq!(host.active_subscriptions(HostEventSource::BackRequested), 1);

    let calls = run_application_calls(&log);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
    assert_eq!(calls[1], r#"__runApplication:["Playground",{"initial":true}]"#);
}

#[tokio::test]
async fn test_dispose_rejects_later_lifecycle_calls() {
    let (mut controller, host, _log) = setup(false);
    controller.on_create(None, None).unwrap();
    let model = Arc::downgrade(&controller.native_object_model().unwrap());

    controller.dispose().await.unwrap();

    assert_eq!(controller.state(), HostState::Disposed);
    assert!(model.upgrade().is_none());
    assert_eq!(host.active_subscriptions(HostEventSource::KeyEvents), 0);
    assert_eq!(host.active_subscriptions(HostEventSource::BackRequested), 0);
    assert!(matches!(
        controller.on_resume(|| {}),
        Err(LifecycleError::InvalidState { .. })
    ));
    assert!(matches!(
        controller.process_events(),
        Err(HostError::Lifecycle(_))
    ));
}
