use script_host::bindings::{Constants, ModuleRegistrar, NativeModule, Promise, RuntimeContext};
use script_host::config::HostConfig;
use script_host::core::BindingResult;
use script_host::platform::{HeadlessHost, KeyEvent, VirtualKey};
use script_host::runtime::{BridgedRuntimeBuilder, ControllerOptions, RuntimeHostController};
use serde_json::{json, Value};
use tempfile::TempDir;
use std::sync::{Arc, Mutex};

const BUNDLE: &str = r#"
function __runApplication(component, props) {
  NativeModules.Recorder.report({ started: component, props: props });
  var model = NativeModules.NativeObjectModel;
  DeviceEventEmitter.addListener(model.OnDataChangedEvent, function () {
    model.getData().then(function (data) {
      NativeModules.Recorder.report({ data: data });
    });
  });
  DeviceEventEmitter.addListener("appStateDidChange", function (event) {
    NativeModules.Recorder.report({ appState: event.app_state });
  });
}
"#;

/// 把脚本侧上报的值记录下来的原生模块
#[derive(Default)]
struct Recorder {
    reports: Mutex<Vec<Value>>,
}

impl Recorder {
    fn reports(&self) -> Vec<Value> {
        self.reports.lock().unwrap().clone()
    }
}

impl NativeModule for Recorder {
    fn name(&self) -> &str {
        "Recorder"
    }

    fn constants(&self) -> Constants {
        Constants::new()
    }

    fn methods(&self) -> &[&'static str] {
        &["report"]
    }

    fn invoke(&self, _method: &str, args: &[Value], promise: Promise) -> BindingResult<()> {
        self.reports
            .lock()
            .unwrap()
            .push(args.first().cloned().unwrap_or(Value::Null));
        promise.resolve(Value::Null);
        Ok(())
    }
}

struct RecorderRegistrar {
    recorder: Arc<Recorder>,
}

impl ModuleRegistrar for RecorderRegistrar {
    fn create_native_modules(&self, _context: &Arc<dyn RuntimeContext>) -> Vec<Arc<dyn NativeModule>> {
        vec![Arc::clone(&self.recorder) as Arc<dyn NativeModule>]
    }
}

type Fixture = (RuntimeHostController<String, BridgedRuntimeBuilder>, Arc<Recorder>, TempDir);

/// 返回的 `TempDir` 在测试结束时删除脚本包
fn setup(developer_mode: bool) -> anyhow::Result<Fixture> {
    let dir = TempDir::new()?;
    let bundle = dir.path().join("index.bundle.js");
    std::fs::write(&bundle, BUNDLE)?;

    let mut config = HostConfig::new("Playground");
    config.runtime.bundle_file_path = Some(bundle);
    config.runtime.developer_mode_enabled = developer_mode;

    let recorder = Arc::new(Recorder::default());
    let options = ControllerOptions {
        registrars: vec![Arc::new(RecorderRegistrar {
            recorder: Arc::clone(&recorder),
        }) as Arc<dyn ModuleRegistrar>],
        ..Default::default()
    };

    let host = HeadlessHost::new();
    let controller = RuntimeHostController::with_options(
        config,
        BridgedRuntimeBuilder::new(),
        Box::new(host.clone()),
        host.root_view_factory(),
        options,
    )?;
    Ok((controller, recorder, dir))
}

#[test]
fn test_object_model_round_trip_through_quickjs() -> anyhow::Result<()> {
    let (mut controller, recorder, _bundle_dir) = setup(false)?;
    controller.on_create(None, Some(json!({ "answer": 42 })))?;

    assert_eq!(
        recorder.reports(),
        vec![json!({ "started": "Playground", "props": { "answer": 42 } })]
    );

    let model = controller
        .native_object_model()
        .ok_or_else(|| anyhow::anyhow!("object model missing after start"))?;
    model.set_data("from host".to_string());
    controller.process_events()?;

    assert_eq!(recorder.reports().last(), Some(&json!({ "data": "from host" })));
    Ok(())
}

#[test]
fn test_app_state_events_reach_script() -> anyhow::Result<()> {
    let (mut controller, recorder, _bundle_dir) = setup(false)?;
    controller.on_create(None, None)?;

    controller.on_resume(|| {})?;
    controller.on_suspend()?;
    controller.process_events()?;

    let states: Vec<Value> = recorder
        .reports()
        .into_iter()
        .filter_map(|report| report.get("appState").cloned())
        .collect();
    assert_eq!(states, vec![json!("active"), json!("background")]);
    Ok(())
}

#[tokio::test]
async fn test_reload_restarts_script_application() -> anyhow::Result<()> {
    let (mut controller, recorder, _bundle_dir) = setup(true)?;
    controller.on_create(None, None)?;

    controller.on_key_event(&KeyEvent::down(VirtualKey::Control))?;
    controller.on_key_event(&KeyEvent::up(VirtualKey::R))?;
    controller.on_new_bundle().await?;

    let starts = recorder
        .reports()
        .into_iter()
        .filter(|report| report.get("started").is_some())
        .count();
    assert_eq!(starts, 3);

    controller.dispose().await?;
    Ok(())
}
