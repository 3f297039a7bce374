//! Host accessors backed by the agent's COM objects.
//!
//! Every object the agent passes us is a dual interface, so we drive it
//! late-bound through `IDispatch` by member name instead of binding its
//! vtable layout. That keeps the shim independent of the agent's type
//! library version.

use std::ffi::c_void;
use std::mem::ManuallyDrop;

use windows::Win32::System::Com::{
    DISPATCH_FLAGS, DISPATCH_METHOD, DISPATCH_PROPERTYGET, DISPATCH_PROPERTYPUT, DISPPARAMS,
    IDispatch,
};
use windows::Win32::System::Ole::DISPID_PROPERTYPUT;
use windows::Win32::System::Variant::{VARIANT, VT_DISPATCH};
use windows::core::{BSTR, GUID, HSTRING, IUnknown, Interface, PCWSTR};

use super::{CallInfo, HookInfo, HostCode, HostProcess, HostResult, Param, ParamList};

const LOCALE_USER_DEFAULT: u32 = 0x0400;

fn host_code(err: windows::core::Error) -> HostCode {
    HostCode(err.code().0)
}

/// An owned reference to one of the agent's dual-interface objects.
pub struct DispatchObject(IDispatch);

impl DispatchObject {
    /// Takes a new reference on an object the agent lent us.
    ///
    /// # Safety
    /// `raw` must be null or a live COM object that implements `IDispatch`.
    pub unsafe fn from_borrowed(raw: *mut c_void) -> Option<Self> {
        if raw.is_null() {
            return None;
        }
        let borrowed = ManuallyDrop::new(unsafe { IDispatch::from_raw(raw) });
        Some(Self(IDispatch::clone(&borrowed)))
    }

    /// Dual objects come back as `VT_DISPATCH`; plain `VT_UNKNOWN` is
    /// queried for `IDispatch`.
    fn from_variant(value: &VARIANT) -> HostResult<Self> {
        if value.vt() == VT_DISPATCH {
            return IDispatch::try_from(value).map(Self).map_err(host_code);
        }
        let unknown = IUnknown::try_from(value).map_err(host_code)?;
        unknown.cast::<IDispatch>().map(Self).map_err(host_code)
    }

    fn dispid(&self, member: &str) -> HostResult<i32> {
        let name = HSTRING::from(member);
        let names = [PCWSTR(name.as_ptr())];
        let mut dispid = 0i32;
        unsafe {
            self.0.GetIDsOfNames(
                &GUID::zeroed(),
                names.as_ptr(),
                1,
                LOCALE_USER_DEFAULT,
                &mut dispid,
            )
        }
        .map_err(host_code)?;
        Ok(dispid)
    }

    fn invoke(
        &self,
        member: &str,
        flags: DISPATCH_FLAGS,
        args: &mut [VARIANT],
        named: &mut [i32],
    ) -> HostResult<VARIANT> {
        let dispid = self.dispid(member)?;
        let params = DISPPARAMS {
            rgvarg: if args.is_empty() { std::ptr::null_mut() } else { args.as_mut_ptr() },
            rgdispidNamedArgs: if named.is_empty() { std::ptr::null_mut() } else { named.as_mut_ptr() },
            cArgs: args.len() as u32,
            cNamedArgs: named.len() as u32,
        };
        let mut result = VARIANT::default();
        unsafe {
            self.0.Invoke(
                dispid,
                &GUID::zeroed(),
                LOCALE_USER_DEFAULT,
                flags,
                &params,
                Some(&mut result),
                None,
                None,
            )
        }
        .map_err(host_code)?;
        Ok(result)
    }

    fn get(&self, property: &str) -> HostResult<VARIANT> {
        self.invoke(property, DISPATCH_PROPERTYGET, &mut [], &mut [])
    }

    fn call(&self, method: &str, args: &mut [VARIANT]) -> HostResult<VARIANT> {
        self.invoke(method, DISPATCH_METHOD | DISPATCH_PROPERTYGET, args, &mut [])
    }

    fn put(&self, property: &str, value: VARIANT) -> HostResult<()> {
        self.invoke(
            property,
            DISPATCH_PROPERTYPUT,
            &mut [value],
            &mut [DISPID_PROPERTYPUT],
        )
        .map(drop)
    }

    fn get_bool(&self, property: &str) -> HostResult<bool> {
        bool::try_from(&self.get(property)?).map_err(host_code)
    }

    fn get_address(&self, property: &str) -> HostResult<usize> {
        // Pointer-sized signed integer: VT_I8 on x64, VT_I4 on x86.
        let value = i64::try_from(&self.get(property)?).map_err(host_code)?;
        Ok(value as isize as usize)
    }
}

pub struct ComHookInfo(DispatchObject);
pub struct ComProcess(DispatchObject);
pub struct ComCallInfo(DispatchObject);
pub struct ComParams(DispatchObject);
pub struct ComParam(DispatchObject);

impl ComHookInfo {
    /// # Safety
    /// See [`DispatchObject::from_borrowed`].
    pub unsafe fn from_borrowed(raw: *mut c_void) -> Option<Self> {
        unsafe { DispatchObject::from_borrowed(raw) }.map(Self)
    }
}

impl ComCallInfo {
    /// # Safety
    /// See [`DispatchObject::from_borrowed`].
    pub unsafe fn from_borrowed(raw: *mut c_void) -> Option<Self> {
        unsafe { DispatchObject::from_borrowed(raw) }.map(Self)
    }
}

impl HookInfo for ComHookInfo {
    type Process = ComProcess;

    fn function_name(&self) -> HostResult<String> {
        let name = BSTR::try_from(&self.0.get("FunctionName")?).map_err(host_code)?;
        Ok(name.to_string())
    }

    fn address(&self) -> HostResult<usize> {
        self.0.get_address("Address")
    }

    fn current_process(&self) -> HostResult<ComProcess> {
        let process = self.0.call("CurrentProcess", &mut [])?;
        DispatchObject::from_variant(&process).map(ComProcess)
    }
}

impl HostProcess for ComProcess {
    fn id(&self) -> HostResult<u32> {
        let id = i32::try_from(&self.0.get("Id")?).map_err(host_code)?;
        Ok(id as u32)
    }
}

impl CallInfo for ComCallInfo {
    type Params = ComParams;

    fn is_pre_call(&self) -> HostResult<bool> {
        self.0.get_bool("IsPreCall")
    }

    fn params(&self) -> HostResult<ComParams> {
        let params = self.0.call("Params", &mut [])?;
        DispatchObject::from_variant(&params).map(ComParams)
    }
}

impl ParamList for ComParams {
    type Param = ComParam;

    fn count(&self) -> HostResult<usize> {
        let count = i32::try_from(&self.0.get("Count")?).map_err(host_code)?;
        Ok(count.max(0) as usize)
    }

    fn get_at(&self, index: usize) -> HostResult<ComParam> {
        let param = self.0.call("GetAt", &mut [VARIANT::from(index as i32)])?;
        DispatchObject::from_variant(&param).map(ComParam)
    }
}

impl Param for ComParam {
    fn is_null_pointer(&self) -> HostResult<bool> {
        self.0.get_bool("IsNullPointer")
    }

    fn evaluate(&self) -> HostResult<ComParam> {
        let value = self.0.call("Evaluate", &mut [])?;
        DispatchObject::from_variant(&value).map(ComParam)
    }

    fn pointer_value(&self) -> HostResult<usize> {
        self.0.get_address("PointerVal")
    }

    fn ulong_value(&self) -> HostResult<u32> {
        u32::try_from(&self.0.get("ULongVal")?).map_err(host_code)
    }

    fn set_ulong_value(&self, value: u32) -> HostResult<()> {
        self.0.put("ULongVal", VARIANT::from(value))
    }
}
