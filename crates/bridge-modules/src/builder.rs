//! Descriptor construction
//!
//! Merges a module's declared-capability interface with its reflectable
//! surface:
//!
//! - **Constants**: the explicit export table, then every constant property
//!   of the type's own surface. A property overwrites an explicit constant
//!   of the same name.
//! - **Methods**: the explicit export list in the module's order, then every
//!   own `Method` member in declaration order. Entries are not deduplicated
//!   by name; both surfaces keep their own index.

use std::sync::{Arc, Weak};

use crate::descriptor::ModuleDescriptor;
use crate::error::{BridgeError, BridgeResult};
use crate::method::MethodEntry;
use crate::name::normalize;
use crate::registry::{IdAllocator, ProcessIds};
use crate::release::{ImplHandle, ReleaseQueue};
use crate::surface::{InterfaceTable, MemberKind, Operation, Property, Reflect};
use crate::value::ConstantTable;

/// Builds [`ModuleDescriptor`]s from module implementations.
pub struct DescriptorBuilder {
    ids: Arc<dyn IdAllocator>,
    release: ReleaseQueue,
}

impl DescriptorBuilder {
    /// Create a builder with an explicit id allocator
    pub fn new(ids: Arc<dyn IdAllocator>, release: ReleaseQueue) -> Self {
        Self { ids, release }
    }

    /// Create a builder backed by the process-wide id counter
    pub fn with_process_ids(release: ReleaseQueue) -> Self {
        Self::new(Arc::new(ProcessIds), release)
    }

    /// Queue that receives implementations of dropped descriptors
    pub fn release_queue(&self) -> &ReleaseQueue {
        &self.release
    }

    /// Build the descriptor for one module instance.
    ///
    /// Fails with [`BridgeError::MissingInterface`] when `T` never
    /// registered its declared-capability interface. No id is consumed on
    /// failure.
    pub fn build<T: Reflect>(&self, module: T) -> BridgeResult<ModuleDescriptor> {
        let (interface, operations, properties) = T::surface().into_parts();
        let interface = interface.ok_or(BridgeError::MissingInterface {
            type_name: std::any::type_name::<T>(),
        })?;

        let module = Arc::new(module);
        let instance: &T = &module;
        let name = normalize(&(interface.module_name)(instance)).to_string();
        let constants = build_constants(instance, &interface, &properties, &name);
        let methods = build_methods(&module, &interface, operations, &name);
        let view_manager = (interface.view_manager)(instance);
        let id = self.ids.next_id();

        tracing::debug!(
            id = id.as_u64(),
            module = %name,
            methods = methods.len(),
            constants = constants.len(),
            "built module descriptor"
        );

        let implementation: ImplHandle = module;
        Ok(ModuleDescriptor::new(
            id,
            name,
            constants,
            methods,
            view_manager,
            implementation,
            self.release.clone(),
        ))
    }
}

impl std::fmt::Debug for DescriptorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorBuilder")
            .field("release", &self.release)
            .finish()
    }
}

fn build_constants<T>(
    module: &T,
    interface: &InterfaceTable<T>,
    properties: &[Property<T>],
    name: &str,
) -> ConstantTable {
    let mut constants = (interface.constants)(module);

    for property in properties.iter().filter(|p| p.is_constant()) {
        if let Some(previous) = constants.insert(property.name(), property.read(module)) {
            tracing::trace!(
                module = %name,
                constant = property.name(),
                previous = %previous,
                "constant property overrides exported constant"
            );
        }
    }

    constants
}

fn build_methods<T: Send + Sync + 'static>(
    module: &Arc<T>,
    interface: &InterfaceTable<T>,
    operations: Vec<Operation<T>>,
    name: &str,
) -> Vec<MethodEntry> {
    let weak: Weak<T> = Arc::downgrade(module);

    let exported = (interface.methods)(&**module);
    let reflected = operations
        .into_iter()
        .filter(|op| op.member_kind() == MemberKind::Method);

    exported
        .into_iter()
        .chain(reflected)
        .map(|op| op.bind(&weak, name))
        .collect()
}
