//! Capability tables for module implementations
//!
//! Modules are not introspected at runtime. Instead each implementation type
//! registers a `Surface` once: the operations and properties it exposes,
//! which of them are inherited from the common base, and (via
//! [`Surface::with_interface`]) whether it satisfies the declared-capability
//! interface [`ModuleInterface`].
//!
//! # Example
//!
//! ```ignore
//! struct Timer;
//!
//! impl ModuleInterface for Timer {
//!     fn module_name(&self) -> String { "RCTTimer".into() }
//! }
//!
//! impl Reflect for Timer {
//!     fn surface() -> Surface<Self> {
//!         Surface::new()
//!             .with_interface()
//!             .operation(Operation::method("start", |_t: &Timer, _| Ok(Value::Null)))
//!             .property(Property::constant("RESOLUTION", |_t: &Timer| Value::from(16)))
//!     }
//! }
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::{InvokeError, InvokeResult};
use crate::method::{MethodEntry, MethodKind, Thunk};
use crate::value::{ConstantTable, Value};

// ============================================================================
// Declared-capability interface
// ============================================================================

/// The contract a module implementation satisfies to report its name,
/// explicit constants and explicit methods.
pub trait ModuleInterface: Sized + Send + Sync + 'static {
    /// Raw module name, before vendor prefixes are stripped
    fn module_name(&self) -> String;

    /// Explicitly exported constants
    fn constants_to_export(&self) -> ConstantTable {
        ConstantTable::new()
    }

    /// Explicitly exported methods, in the module's chosen order
    fn methods_to_export(&self) -> Vec<Operation<Self>> {
        Vec::new()
    }

    /// Name of the view manager backing this module, if any
    fn view_manager(&self) -> Option<String> {
        None
    }
}

/// Implementation types that publish a capability table.
pub trait Reflect: Sized + Send + Sync + 'static {
    /// Build the registration-time capability table for this type
    fn surface() -> Surface<Self>;
}

// ============================================================================
// Operations
// ============================================================================

/// Kind of member found on the reflectable surface.
///
/// Only `Method` members become catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemberKind {
    /// Ordinary invokable method
    #[default]
    Method,
    /// Notification emitted by the object
    Signal,
    /// Slot connected to signals
    Slot,
    /// Constructor
    Constructor,
}

/// Unbound operation function
pub type OperationFn<T> = Arc<dyn Fn(&T, &[Value]) -> InvokeResult<Value> + Send + Sync>;

/// An operation declared for implementation type `T`, not yet bound to an
/// instance.
pub struct Operation<T> {
    name: String,
    kind: MethodKind,
    member: MemberKind,
    arity: Option<usize>,
    call: OperationFn<T>,
}

impl<T: Send + Sync + 'static> Operation<T> {
    /// Declare a plain method
    pub fn method(
        name: impl Into<String>,
        call: impl Fn(&T, &[Value]) -> InvokeResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Direct,
            member: MemberKind::Method,
            arity: None,
            call: Arc::new(call),
        }
    }

    /// Set the calling convention
    pub fn kind(mut self, kind: MethodKind) -> Self {
        self.kind = kind;
        self
    }

    /// Mark as completing through a deferred result
    pub fn asynchronous(self) -> Self {
        self.kind(MethodKind::Async)
    }

    /// Mark as a blocking bridge call
    pub fn remote_sync(self) -> Self {
        self.kind(MethodKind::RemoteSync)
    }

    /// Set the member kind
    pub fn member(mut self, member: MemberKind) -> Self {
        self.member = member;
        self
    }

    /// Set the parameter count
    pub fn arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Operation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member kind
    pub fn member_kind(&self) -> MemberKind {
        self.member
    }

    /// Bind to an implementation instance.
    ///
    /// The thunk holds a weak reference and upgrades it for the duration of
    /// each call, so the instance stays alive while a call is on the stack.
    pub(crate) fn bind(self, module: &Weak<T>, module_name: &str) -> MethodEntry {
        let weak = module.clone();
        let owner = module_name.to_string();
        let call = self.call;
        let thunk: Thunk = Arc::new(move |args: &[Value]| -> InvokeResult<Value> {
            let module = weak.upgrade().ok_or_else(|| InvokeError::ModuleReleased {
                module: owner.clone(),
            })?;
            call(&*module, args)
        });
        MethodEntry::from_parts(self.name, self.kind, self.arity, thunk)
    }
}

impl<T> Clone for Operation<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            member: self.member,
            arity: self.arity,
            call: Arc::clone(&self.call),
        }
    }
}

impl<T> fmt::Debug for Operation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("member", &self.member)
            .field("arity", &self.arity)
            .finish()
    }
}

// ============================================================================
// Properties
// ============================================================================

/// Property reader
pub type PropertyFn<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// A readable property of implementation type `T`.
pub struct Property<T> {
    name: String,
    constant: bool,
    read: PropertyFn<T>,
}

impl<T> Property<T> {
    /// Declare an immutable property (exported as a constant)
    pub fn constant(
        name: impl Into<String>,
        read: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            constant: true,
            read: Arc::new(read),
        }
    }

    /// Declare a mutable property (never exported)
    pub fn mutable(
        name: impl Into<String>,
        read: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            constant: false,
            read: Arc::new(read),
        }
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the property is immutable
    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// Read the property from an instance
    pub fn read(&self, module: &T) -> Value {
        (self.read)(module)
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("constant", &self.constant)
            .finish()
    }
}

// ============================================================================
// Surface
// ============================================================================

/// Function table for the declared-capability interface of `T`.
pub(crate) struct InterfaceTable<T> {
    pub(crate) module_name: fn(&T) -> String,
    pub(crate) constants: fn(&T) -> ConstantTable,
    pub(crate) methods: fn(&T) -> Vec<Operation<T>>,
    pub(crate) view_manager: fn(&T) -> Option<String>,
}

/// Registration-time capability table of an implementation type.
///
/// Inherited members always precede the type's own members; the offsets
/// mark where the own members start.
pub struct Surface<T> {
    interface: Option<InterfaceTable<T>>,
    operations: Vec<Operation<T>>,
    method_offset: usize,
    properties: Vec<Property<T>>,
    property_offset: usize,
}

impl<T: Send + Sync + 'static> Surface<T> {
    /// Create an empty surface without an interface
    pub fn new() -> Self {
        Self {
            interface: None,
            operations: Vec::new(),
            method_offset: 0,
            properties: Vec::new(),
            property_offset: 0,
        }
    }

    /// Register the declared-capability interface of `T`
    pub fn with_interface(mut self) -> Self
    where
        T: ModuleInterface,
    {
        self.interface = Some(InterfaceTable {
            module_name: T::module_name,
            constants: T::constants_to_export,
            methods: T::methods_to_export,
            view_manager: T::view_manager,
        });
        self
    }

    /// Add an operation inherited from the common base
    pub fn inherit_operation(mut self, op: Operation<T>) -> Self {
        self.operations.insert(self.method_offset, op);
        self.method_offset += 1;
        self
    }

    /// Add an operation declared by the type itself
    pub fn operation(mut self, op: Operation<T>) -> Self {
        self.operations.push(op);
        self
    }

    /// Shorthand for a plain method
    pub fn method(
        self,
        name: impl Into<String>,
        call: impl Fn(&T, &[Value]) -> InvokeResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.operation(Operation::method(name, call))
    }

    /// Add a property inherited from the common base
    pub fn inherit_property(mut self, property: Property<T>) -> Self {
        self.properties.insert(self.property_offset, property);
        self.property_offset += 1;
        self
    }

    /// Add a property declared by the type itself
    pub fn property(mut self, property: Property<T>) -> Self {
        self.properties.push(property);
        self
    }

    /// Whether the declared-capability interface was registered
    pub fn has_interface(&self) -> bool {
        self.interface.is_some()
    }

    /// Number of inherited operations
    pub fn method_offset(&self) -> usize {
        self.method_offset
    }

    /// Number of inherited properties
    pub fn property_offset(&self) -> usize {
        self.property_offset
    }

    /// All operations, inherited first
    pub fn operations(&self) -> &[Operation<T>] {
        &self.operations
    }

    /// All properties, inherited first
    pub fn properties(&self) -> &[Property<T>] {
        &self.properties
    }

    /// Split into the interface table and the type's own members
    pub(crate) fn into_parts(
        self,
    ) -> (Option<InterfaceTable<T>>, Vec<Operation<T>>, Vec<Property<T>>) {
        let Surface {
            interface,
            mut operations,
            method_offset,
            mut properties,
            property_offset,
        } = self;
        let own_operations = operations.split_off(method_offset);
        let own_properties = properties.split_off(property_offset);
        (interface, own_operations, own_properties)
    }
}

impl<T: Send + Sync + 'static> Default for Surface<T> {
    fn default() -> Self {
        Self::new()
    }
}
