//! Hand-off to the code that patches vtables on the captured objects.
//!
//! The shim only finds the objects. `Present`, `CreateSwapChain` and
//! `CreateSwapChainForHwnd` are hooked by a companion module that exports
//! one entry point per hook family.

use std::ffi::c_void;

use libloading::Library;

use crate::error::ShimError;
use crate::handle::{DeviceHandle, Factory2Handle, FactoryHandle, SwapChainHandle};

/// Receives captured objects, synchronously, on the callback's thread.
pub trait HookInstaller {
    /// Hooks `IDXGISwapChain::Present`. Either side may be absent when the
    /// game passed a null out-parameter.
    fn install_present_hooks(&self, device: Option<DeviceHandle>, swap_chain: Option<SwapChainHandle>);

    /// Hooks `IDXGIFactory::CreateSwapChain`.
    fn install_create_swap_chain_hooks(&self, factory: FactoryHandle);

    /// Hooks `IDXGIFactory2::CreateSwapChainForHwnd`.
    fn install_create_swap_chain_for_hwnd_hooks(&self, factory: Factory2Handle);
}

type HookPresentFn = unsafe extern "system" fn(*mut c_void, *mut c_void);
type HookFactoryFn = unsafe extern "system" fn(*mut c_void);

const HOOK_PRESENT: (&str, &[u8]) = ("HookPresent", b"HookPresent\0");
const HOOK_CREATE_SWAP_CHAIN: (&str, &[u8]) = ("HookCreateSwapChain", b"HookCreateSwapChain\0");
const HOOK_CREATE_SWAP_CHAIN_FOR_HWND: (&str, &[u8]) =
    ("HookCreateSwapChainForHwnd", b"HookCreateSwapChainForHwnd\0");

/// Installer entry points resolved by name from the companion module.
pub struct ExportedInstaller {
    hook_present: HookPresentFn,
    hook_create_swap_chain: HookFactoryFn,
    hook_create_swap_chain_for_hwnd: HookFactoryFn,
    // Keeps the entry points above mapped.
    _module: Library,
}

unsafe fn resolve<T: Copy>(
    module: &Library,
    module_name: &str,
    (name, symbol): (&'static str, &[u8]),
) -> Result<T, ShimError> {
    match unsafe { module.get::<T>(symbol) } {
        Ok(f) => Ok(*f),
        Err(source) => Err(ShimError::MissingExport {
            module: module_name.to_owned(),
            symbol: name,
            source,
        }),
    }
}

impl ExportedInstaller {
    /// Loads `module_name` and resolves all three entry points.
    ///
    /// Fails if any export is missing so that a half-wired shim is never
    /// published.
    pub fn load(module_name: &str) -> Result<Self, ShimError> {
        let module = unsafe { Library::new(module_name) }.map_err(|source| ShimError::ModuleLoad {
            module: module_name.to_owned(),
            source,
        })?;

        unsafe {
            let hook_present = resolve::<HookPresentFn>(&module, module_name, HOOK_PRESENT)?;
            let hook_create_swap_chain =
                resolve::<HookFactoryFn>(&module, module_name, HOOK_CREATE_SWAP_CHAIN)?;
            let hook_create_swap_chain_for_hwnd =
                resolve::<HookFactoryFn>(&module, module_name, HOOK_CREATE_SWAP_CHAIN_FOR_HWND)?;

            log::debug!("Resolved hook installers from {}", module_name);

            Ok(Self {
                hook_present,
                hook_create_swap_chain,
                hook_create_swap_chain_for_hwnd,
                _module: module,
            })
        }
    }
}

impl HookInstaller for ExportedInstaller {
    fn install_present_hooks(&self, device: Option<DeviceHandle>, swap_chain: Option<SwapChainHandle>) {
        let device = device.map_or(std::ptr::null_mut(), |d| d.as_ptr());
        let swap_chain = swap_chain.map_or(std::ptr::null_mut(), |s| s.as_ptr());
        unsafe { (self.hook_present)(device, swap_chain) }
    }

    fn install_create_swap_chain_hooks(&self, factory: FactoryHandle) {
        unsafe { (self.hook_create_swap_chain)(factory.as_ptr()) }
    }

    fn install_create_swap_chain_for_hwnd_hooks(&self, factory: Factory2Handle) {
        unsafe { (self.hook_create_swap_chain_for_hwnd)(factory.as_ptr()) }
    }
}
