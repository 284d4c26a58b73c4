//! Native Binding Layer
//!
//! Host-defined capabilities exposed to script code.
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Script code (NativeModules.*, DeviceEventEmitter)          │
//! │                          ^  │                               │
//! │          events (emit)   │  │  calls (JSON envelope)        │
//! │                          │  v                               │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │      ModuleBridge (one per runtime generation)      │   │
//! │  └───────────────────────┬─────────────────────────────┘   │
//! │                          │                                  │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │  ModuleRegistrar -> NativeModule (NativeObjectModel) │   │
//! │  └─────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod module_bridge;
pub mod object_model;
pub mod protocol;
pub mod registrar;

pub use module_bridge::{InvocationEnvelope, ModuleBridge, ModuleDescriptor};
pub use object_model::{
    ModelValue, NativeObjectModel, OBJECT_MODEL_MODULE_NAME, ON_DATA_CHANGED_EVENT,
};
pub use protocol::*;
pub use registrar::{default_model_factory, ModelArena, ModelFactory, ObjectModelRegistrar};
