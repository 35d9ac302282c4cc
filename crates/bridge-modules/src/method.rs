//! Method catalog entries
//!
//! A `MethodEntry` is one invokable operation of a module as seen by the
//! invocation layer: its exported name, its calling convention, and a thunk
//! already bound to the owning implementation object.

use std::fmt;
use std::sync::Arc;

use crate::error::InvokeResult;
use crate::value::Value;

/// Calling convention of an exported method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MethodKind {
    /// Plain callable, no special bridge treatment
    #[default]
    Direct,
    /// Bridge call completes through a deferred (promise-like) result
    Async,
    /// Bridge call blocks and returns its value synchronously
    RemoteSync,
}

impl MethodKind {
    /// Short name used in logs
    pub const fn as_str(self) -> &'static str {
        match self {
            MethodKind::Direct => "direct",
            MethodKind::Async => "async",
            MethodKind::RemoteSync => "sync",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bound invocation thunk
pub type Thunk = Arc<dyn Fn(&[Value]) -> InvokeResult<Value> + Send + Sync>;

/// Immutable description of one invokable operation.
#[derive(Clone)]
pub struct MethodEntry {
    name: String,
    kind: MethodKind,
    arity: Option<usize>,
    invoke: Thunk,
}

impl MethodEntry {
    /// Create an entry from an already-bound thunk
    pub fn new(
        name: impl Into<String>,
        kind: MethodKind,
        invoke: impl Fn(&[Value]) -> InvokeResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            arity: None,
            invoke: Arc::new(invoke),
        }
    }

    pub(crate) fn from_parts(
        name: String,
        kind: MethodKind,
        arity: Option<usize>,
        invoke: Thunk,
    ) -> Self {
        Self {
            name,
            kind,
            arity,
            invoke,
        }
    }

    /// Exported name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calling convention
    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    /// Declared parameter count, when the surface reports one
    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    /// Execute the operation against the owning implementation
    pub fn invoke(&self, args: &[Value]) -> InvokeResult<Value> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("arity", &self.arity)
            .finish()
    }
}
