//! Entry points the hooking agent looks up by name after loading the shim.
//!
//! A negative `HRESULT` from any of them makes the agent remove every hook
//! and unload us, so failures are logged here and passed on as-is.

use std::ffi::c_void;

use windows::core::{HRESULT, PCWSTR};

use crate::error::{ShimError, Status};
use crate::host::com::{ComCallInfo, ComHookInfo};
use crate::plugin;

fn report(callback: &str, result: Result<(), ShimError>) -> HRESULT {
    if let Err(e) = &result {
        log::error!("{} failed: {}", callback, e);
    }
    HRESULT(Status::from(result).0)
}

/// Decodes the hook's custom parameters, replacing unpaired surrogates.
///
/// # Safety
/// `parameters` must be null or a NUL-terminated UTF-16 string.
unsafe fn parameters_text(parameters: PCWSTR) -> String {
    if parameters.is_null() {
        return String::new();
    }
    String::from_utf16_lossy(unsafe { parameters.as_wide() })
}

unsafe fn borrow_hook_info(raw: *mut c_void) -> Result<ComHookInfo, ShimError> {
    unsafe { ComHookInfo::from_borrowed(raw) }.ok_or(ShimError::NullHostObject("hook info"))
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn OnLoad() -> HRESULT {
    report("OnLoad", plugin::on_load())
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn OnUnload() {
    plugin::on_unload();
}

/// # Safety
/// `hook_info` must be the agent's hook info object and `parameters` null or
/// a NUL-terminated UTF-16 string, both valid for the duration of the call.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "system" fn OnHookAdded(
    hook_info: *mut c_void,
    chain_index: u32,
    parameters: PCWSTR,
) -> HRESULT {
    let result = (|| {
        let dispatcher = plugin::dispatcher()?;
        let hook = unsafe { borrow_hook_info(hook_info) }?;
        let parameters = unsafe { parameters_text(parameters) };
        dispatcher.on_hook_added(&hook, chain_index, &parameters)
    })();
    report("OnHookAdded", result)
}

/// # Safety
/// `hook_info` must be the agent's hook info object, valid for the call.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "system" fn OnHookRemoved(hook_info: *mut c_void, chain_index: u32) {
    let result = (|| {
        let dispatcher = plugin::dispatcher()?;
        let hook = unsafe { borrow_hook_info(hook_info) }?;
        dispatcher.on_hook_removed(&hook, chain_index)
    })();
    if let Err(e) = result {
        log::error!("OnHookRemoved failed: {}", e);
    }
}

/// # Safety
/// Both pointers must be the agent's objects for this call, valid until it
/// returns.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "system" fn OnFunctionCall(
    hook_info: *mut c_void,
    chain_index: u32,
    call_info: *mut c_void,
) -> HRESULT {
    let result = (|| {
        let dispatcher = plugin::dispatcher()?;
        let hook = unsafe { borrow_hook_info(hook_info) }?;
        let call = unsafe { ComCallInfo::from_borrowed(call_info) }
            .ok_or(ShimError::NullHostObject("call info"))?;
        dispatcher.on_function_call(&hook, chain_index, &call)
    })();
    report("OnFunctionCall", result)
}
