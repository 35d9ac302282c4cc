//! Module descriptors
//!
//! A `ModuleDescriptor` is the bridge's view of one module instance: its
//! process-unique id, public name, constants and method catalog. The
//! position of a method in the catalog is its wire index; the remote runtime
//! caches behavior by that index, so the catalog never changes after
//! construction.
//!
//! # Wire format
//!
//! ```text
//! [name, constants]                                   (no methods)
//! [name, constants, [method names], [async indices]]  (one or more methods)
//! ```
//!
//! `constants` is always present, as an empty map when there are none.

use std::fmt;

use crate::method::{MethodEntry, MethodKind};
use crate::registry::ModuleId;
use crate::release::{ImplHandle, ReleaseQueue};
use crate::value::{ConstantTable, Value};

/// Method names and calling-convention index lists of a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodCatalog {
    /// Method names, index = wire id
    pub names: Vec<String>,
    /// Indices of `Async` methods
    pub async_indices: Vec<usize>,
    /// Indices of `RemoteSync` methods
    pub sync_indices: Vec<usize>,
}

impl MethodCatalog {
    fn from_methods(methods: &[MethodEntry]) -> Self {
        let mut catalog = MethodCatalog {
            names: Vec::with_capacity(methods.len()),
            ..Default::default()
        };
        for (index, method) in methods.iter().enumerate() {
            catalog.names.push(method.name().to_string());
            match method.kind() {
                MethodKind::Async => catalog.async_indices.push(index),
                MethodKind::RemoteSync => catalog.sync_indices.push(index),
                MethodKind::Direct => {}
            }
        }
        catalog
    }
}

/// One module's identity, constants and ordered method catalog.
///
/// Owns the module implementation. Dropping the descriptor queues the
/// implementation on its [`ReleaseQueue`]; it is freed when the queue is
/// drained.
pub struct ModuleDescriptor {
    id: ModuleId,
    name: String,
    constants: ConstantTable,
    methods: Vec<MethodEntry>,
    view_manager: Option<String>,
    implementation: Option<ImplHandle>,
    release: ReleaseQueue,
}

impl ModuleDescriptor {
    pub(crate) fn new(
        id: ModuleId,
        name: String,
        constants: ConstantTable,
        methods: Vec<MethodEntry>,
        view_manager: Option<String>,
        implementation: ImplHandle,
        release: ReleaseQueue,
    ) -> Self {
        Self {
            id,
            name,
            constants,
            methods,
            view_manager,
            implementation: Some(implementation),
            release,
        }
    }

    /// Process-unique id
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Public module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exported constants
    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    /// Method catalog in wire order
    pub fn methods(&self) -> &[MethodEntry] {
        &self.methods
    }

    /// Number of catalog entries
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Look up a method by wire index.
    ///
    /// # Panics
    /// Panics if `index` is out of range. Indices received over the wire
    /// must be validated against the catalog first (see [`get_method`]).
    ///
    /// [`get_method`]: ModuleDescriptor::get_method
    pub fn method(&self, index: usize) -> &MethodEntry {
        &self.methods[index]
    }

    /// Look up a method by wire index, `None` when out of range
    pub fn get_method(&self, index: usize) -> Option<&MethodEntry> {
        self.methods.get(index)
    }

    /// View manager backing this module, if any
    pub fn view_manager(&self) -> Option<&str> {
        self.view_manager.as_deref()
    }

    /// Names and calling-convention indices of the catalog
    pub fn catalog(&self) -> MethodCatalog {
        MethodCatalog::from_methods(&self.methods)
    }

    /// Descriptor sent to the remote runtime during handshake.
    pub fn info(&self) -> Value {
        let mut config = vec![Value::from(self.name.as_str()), self.constants.to_value()];

        let catalog = self.catalog();
        if !catalog.names.is_empty() {
            config.push(Value::from(catalog.names));
            config.push(indices(&catalog.async_indices));
            // Sync indices stay off the wire until the runtime has a
            // blocking call hook.
        }

        Value::List(config)
    }

    /// [`info`](ModuleDescriptor::info) rendered as JSON
    pub fn info_json(&self) -> String {
        self.info().to_json()
    }
}

fn indices(list: &[usize]) -> Value {
    Value::List(list.iter().map(|&i| Value::Number(i as f64)).collect())
}

impl Drop for ModuleDescriptor {
    fn drop(&mut self) {
        if let Some(handle) = self.implementation.take() {
            self.release.defer(self.name.as_str(), handle);
        }
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("constants", &self.constants.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entry(name: &str, kind: MethodKind) -> MethodEntry {
        MethodEntry::new(name, kind, |_| Ok(Value::Null))
    }

    fn descriptor(methods: Vec<MethodEntry>, queue: &ReleaseQueue) -> ModuleDescriptor {
        ModuleDescriptor::new(
            ModuleId::from_u64(7),
            "Timer".to_string(),
            ConstantTable::new(),
            methods,
            None,
            Arc::new(()),
            queue.clone(),
        )
    }

    #[test]
    fn test_catalog_partitions_kinds() {
        let queue = ReleaseQueue::new();
        let d = descriptor(
            vec![
                entry("a", MethodKind::Direct),
                entry("b", MethodKind::Async),
                entry("c", MethodKind::RemoteSync),
                entry("d", MethodKind::Async),
            ],
            &queue,
        );
        let catalog = d.catalog();
        assert_eq!(catalog.names, vec!["a", "b", "c", "d"]);
        assert_eq!(catalog.async_indices, vec![1, 3]);
        assert_eq!(catalog.sync_indices, vec![2]);
    }

    #[test]
    fn test_info_withholds_sync_indices() {
        let queue = ReleaseQueue::new();
        let d = descriptor(
            vec![entry("now", MethodKind::RemoteSync), entry("tick", MethodKind::Direct)],
            &queue,
        );
        assert_eq!(d.info_json(), r#"["Timer",{},["now","tick"],[]]"#);
    }

    #[test]
    fn test_info_without_methods() {
        let queue = ReleaseQueue::new();
        let d = descriptor(Vec::new(), &queue);
        assert_eq!(d.info().as_list().map(<[Value]>::len), Some(2));
        assert_eq!(d.info_json(), r#"["Timer",{}]"#);
    }

    #[test]
    fn test_method_lookup() {
        let queue = ReleaseQueue::new();
        let d = descriptor(vec![entry("start", MethodKind::Direct)], &queue);
        assert_eq!(d.method(0).name(), "start");
        assert!(d.get_method(1).is_none());
        assert_eq!(d.method_count(), 1);
    }

    #[test]
    #[should_panic]
    fn test_method_out_of_range_panics() {
        let queue = ReleaseQueue::new();
        let d = descriptor(Vec::new(), &queue);
        let _ = d.method(0);
    }

    #[test]
    fn test_drop_defers_release() {
        let queue = ReleaseQueue::new();
        let d = descriptor(Vec::new(), &queue);
        assert_eq!(d.id().as_u64(), 7);
        assert!(queue.is_empty());
        drop(d);
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.drain(), 1);
    }
}
