//! # Script Host
//!
//! Embeds a JavaScript runtime inside a native host application and manages its
//! whole lifecycle: creation, suspend/resume, developer reload and ordered
//! asynchronous teardown.
//!
//! ## Features
//!
//! - **Runtime Host Controller**: owns one runtime manager and one root view per generation
//! - **Native Object Model**: a typed host value shared with script code, with change notification
//! - **Developer Input**: Shift+F10 / Alt opens the dev menu, Ctrl+R reloads the bundle
//! - **QuickJS Backend**: default script executor built on rquickjs
//! - **Configuration**: TOML/JSON files, environment overrides and launch arguments
//!
//! ### Example
//!
//! ```ignore
//! use script_host::config::HostConfig;
//! use script_host::platform::HeadlessHost;
//! use script_host::runtime::{BridgedRuntimeBuilder, RuntimeHostController};
//!
//! let host = HeadlessHost::new();
//! let mut controller = RuntimeHostController::<String, _>::new(
//!     HostConfig::new("Playground"),
//!     BridgedRuntimeBuilder::new(),
//!     Box::new(host.clone()),
//!     host.root_view_factory(),
//! )?;
//! controller.on_create(Some("remoteDebugging,true"), None)?;
//! controller.native_object_model().unwrap().set_data("hello".into());
//! controller.process_events()?;
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Errors, logging, generations
//! - [`config`]: Host configuration and launch arguments
//! - [`bindings`]: Native module protocol and the native object model
//! - [`platform`]: Root view, host environment and input abstractions
//! - [`runtime`]: Runtime manager, script executors and the host controller

/// Errors, logging and generation bookkeeping
#[macro_use]
pub mod core;
/// Configuration system
pub mod config;
/// Native modules exposed to script code
pub mod bindings;
/// Host platform abstractions
pub mod platform;
/// Runtime management and the host controller
pub mod runtime;
