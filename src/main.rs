//! Headless playground: runs the demo bundle through a full host lifecycle.

use script_host::config::HostConfig;
use script_host::core::{initialize_logging, HostResult};
use script_host::platform::{BackRequestedArgs, HeadlessHost, KeyEvent, VirtualKey};
use script_host::runtime::{BridgedRuntimeBuilder, RuntimeHostController};
use serde_json::json;
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Script host failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> HostResult<()> {
    let mut config = HostConfig::load_or_default();
    config.apply_env_overrides();
    initialize_logging(&config.logging);

    if config.runtime.main_component_name.trim().is_empty() {
        config.runtime.main_component_name = "Playground".to_string();
    }
    if config.runtime.bundle_file_path.is_none() {
        config.runtime.bundle_file_path =
            Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join("playground.bundle.js"));
    }
    let developer_mode = config.runtime.developer_mode_enabled;

    let host = HeadlessHost::new();
    let mut controller = RuntimeHostController::<String, _>::new(
        config,
        BridgedRuntimeBuilder::new(),
        Box::new(host.clone()),
        host.root_view_factory(),
    )?;

    let initialized = controller.context_initialized();
    let launch_arguments = std::env::args().nth(1);
    controller.on_create(launch_arguments.as_deref(), Some(json!({ "greeting": "hello" })))?;

    if let Some(signal) = initialized {
        let context = signal.wait().await?;
        tracing::info!(target: "host", state = %context.lifecycle_state(), "Context ready");
    }

    controller.on_resume(|| tracing::info!(target: "host", "Back navigation fell through to the host"))?;

    if let Some(model) = controller.native_object_model() {
        model.set_data("updated from host".to_string());
    }
    controller.process_events()?;

    let mut back = BackRequestedArgs::default();
    controller.on_back_requested(&mut back)?;

    if developer_mode {
        for event in [
            KeyEvent::down(VirtualKey::Control),
            KeyEvent::down(VirtualKey::R),
            KeyEvent::up(VirtualKey::R),
            KeyEvent::up(VirtualKey::Control),
        ] {
            controller.on_key_event(&event)?;
        }
    }

    controller.on_new_bundle().await?;
    controller.process_events()?;
    tracing::info!(target: "host", generation = %controller.generation(), "Bundle reloaded");

    controller.on_suspend()?;
    controller.process_events()?;
    controller.dispose().await?;
    Ok(())
}
