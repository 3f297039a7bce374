//! Accessors the hooking host hands to every callback.
//!
//! The host owns all of these objects. They are only valid for the duration
//! of the callback that received them, so nothing here is `'static` and the
//! dispatcher never stores them.

#[cfg(target_os = "windows")]
pub mod com;

use std::fmt;

/// Raw status code returned by a failing host accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCode(pub i32);

impl fmt::Display for HostCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0 as u32)
    }
}

pub type HostResult<T> = Result<T, HostCode>;

/// The process that owns an installed hook.
pub trait HostProcess {
    fn id(&self) -> HostResult<u32>;
}

/// Describes one installed hook: which export it intercepts and where.
pub trait HookInfo {
    type Process: HostProcess;

    /// Qualified name, `MODULE.DLL!Function`.
    fn function_name(&self) -> HostResult<String>;

    fn address(&self) -> HostResult<usize>;

    fn current_process(&self) -> HostResult<Self::Process>;
}

/// One intercepted invocation.
pub trait CallInfo {
    type Params: ParamList;

    fn is_pre_call(&self) -> HostResult<bool>;

    fn params(&self) -> HostResult<Self::Params>;
}

/// Positional view over the intercepted function's arguments.
pub trait ParamList {
    type Param: Param;

    fn count(&self) -> HostResult<usize>;

    fn get_at(&self, index: usize) -> HostResult<Self::Param>;
}

/// A single argument slot.
pub trait Param: Sized {
    /// True when the slot holds a null pointer.
    fn is_null_pointer(&self) -> HostResult<bool>;

    /// Dereferences a pointer argument, yielding the pointed-to value.
    fn evaluate(&self) -> HostResult<Self>;

    fn pointer_value(&self) -> HostResult<usize>;

    fn ulong_value(&self) -> HostResult<u32>;

    /// Writes through to the live argument; takes effect before the
    /// original function runs when called pre-call.
    fn set_ulong_value(&self, value: u32) -> HostResult<()>;
}
