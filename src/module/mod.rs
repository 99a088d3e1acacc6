//! Module Registry
//!
//! Modules group directories inside an application. The registry is built
//! once at bootstrap from config and handed to the HTTP layer; it is
//! read-mostly afterwards.

mod registry;

pub use registry::{ModuleConfig, ModuleDescriptor, ModuleKind, ModuleRegistry, DEFAULT_MODULE_ID};
