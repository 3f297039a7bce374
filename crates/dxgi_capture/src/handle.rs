//! Typed, non-owning views of interface pointers taken out of intercepted
//! calls.
//!
//! The host gives us plain addresses. Turning one into "an IDXGIFactory" or
//! "an ID3D11Device" is an unchecked claim that only the intercepted ABI can
//! back, so it happens in exactly one place: [`interpret_foreign_handle`].

use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;

/// `IDXGIFactory`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factory {}

/// `IDXGIFactory2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factory2 {}

/// `ID3D11Device`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {}

/// `IDXGISwapChain`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapChain {}

/// Address of a foreign COM object believed to implement `T`.
///
/// No reference is held: the game owns the object and the downstream hook
/// installer decides what to do with its lifetime.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ForeignHandle<T> {
    address: usize,
    _interface: PhantomData<fn() -> T>,
}

pub type FactoryHandle = ForeignHandle<Factory>;
pub type Factory2Handle = ForeignHandle<Factory2>;
pub type DeviceHandle = ForeignHandle<Device>;
pub type SwapChainHandle = ForeignHandle<SwapChain>;

/// Reinterprets `address` as an instance of `T`.
///
/// Nothing is dereferenced and nothing is type-checked; the caller vouches
/// that the intercepted function wrote a `T*` at the slot it read. A zero
/// address yields a null handle rather than `None` so that callers which do
/// not null-check still forward exactly what they saw.
pub fn interpret_foreign_handle<T>(address: usize) -> ForeignHandle<T> {
    ForeignHandle {
        address,
        _interface: PhantomData,
    }
}

impl<T> ForeignHandle<T> {
    pub fn address(self) -> usize {
        self.address
    }

    pub fn is_null(self) -> bool {
        self.address == 0
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.address as *mut c_void
    }
}

impl FactoryHandle {
    /// Views the factory as `IDXGIFactory2` without a `QueryInterface`.
    ///
    /// The `CreateSwapChainForHwnd` installer only patches the vtable slot
    /// that `IDXGIFactory2` adds; it never calls through the handle.
    pub fn as_factory2(self) -> Factory2Handle {
        interpret_foreign_handle(self.address)
    }
}

impl<T> fmt::Debug for ForeignHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = std::any::type_name::<T>();
        let short = name.rsplit("::").next().unwrap_or(name);
        write!(f, "{}@0x{:X}", short, self.address)
    }
}
