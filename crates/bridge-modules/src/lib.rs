//! Bridge Modules - native module descriptors for the scripting bridge
//!
//! Turns a native module implementation into what the remote scripting
//! runtime needs at handshake time: a process-unique id, a public name, a
//! constant table and an index-stable method catalog.
//!
//! # Example
//!
//! ```ignore
//! use bridge_modules::{DescriptorBuilder, ModuleInterface, Operation, Reflect, ReleaseQueue, Surface, Value};
//!
//! struct Timer;
//!
//! impl ModuleInterface for Timer {
//!     fn module_name(&self) -> String {
//!         "RCTTimer".to_string()
//!     }
//! }
//!
//! impl Reflect for Timer {
//!     fn surface() -> Surface<Self> {
//!         Surface::new()
//!             .with_interface()
//!             .method("start", |_t: &Timer, _args: &[Value]| Ok(Value::Null))
//!             .operation(Operation::method("stop", |_t: &Timer, _args: &[Value]| Ok(Value::Null)).asynchronous())
//!     }
//! }
//!
//! let releases = ReleaseQueue::new();
//! let builder = DescriptorBuilder::with_process_ids(releases.clone());
//! let timer = builder.build(Timer)?;
//! assert_eq!(timer.info_json(), r#"["Timer",{},["start","stop"],[1]]"#);
//!
//! drop(timer);
//! releases.drain();
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod method;
pub mod name;
pub mod registry;
pub mod release;
pub mod surface;
pub mod value;

pub use builder::DescriptorBuilder;
pub use descriptor::{MethodCatalog, ModuleDescriptor};
pub use error::{BridgeError, BridgeResult, InvokeError, InvokeResult};
pub use method::{MethodEntry, MethodKind, Thunk};
pub use name::normalize;
pub use registry::{IdAllocator, ModuleId, ModuleRegistry, ProcessIds};
pub use release::{ImplHandle, ReleaseQueue};
pub use surface::{MemberKind, ModuleInterface, Operation, Property, Reflect, Surface};
pub use value::{ConstantTable, Value};
