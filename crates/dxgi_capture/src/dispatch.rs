//! Routes host callbacks to the capture logic for each intercepted export.
//!
//! Chain of events for a typical DX11 title:
//! 1. The game calls `CreateDXGIFactory1` (possibly through a wrapper DLL that
//!    forwards to the system one).
//! 2. The host runs the original, then calls us post-call. We take the new
//!    factory and hand it to the `CreateSwapChain` installers.
//! 3. The game creates its swap chain through that factory, which the
//!    installed hooks see, and from there `Present`.
//!
//! Games that go through `D3D11CreateDeviceAndSwapChain` skip the factory and
//! the `Present` hooks are installed directly from the returned swap chain.

use crate::capture::{CaptureState, PidRecord};
use crate::error::ShimError;
use crate::handle::{ForeignHandle, interpret_foreign_handle};
use crate::host::{CallInfo, HookInfo, HostProcess, Param, ParamList};
use crate::installer::HookInstaller;
use crate::signature::{self, CaptureAction, CallSignature, D3D11_CREATE_DEVICE_DEBUG};

pub struct Dispatcher<I> {
    installer: I,
    capture: CaptureState,
    inject_debug_device: bool,
}

fn describe<H: HookInfo>(hook: &H) -> Result<(String, usize), ShimError> {
    let name = hook.function_name().map_err(ShimError::FunctionName)?;
    let address = hook.address().map_err(ShimError::Address)?;
    Ok((name, address))
}

/// Evaluates the out-parameter at `index` and reads the address it held.
fn resolve<T, P: Param>(param: &P, index: usize) -> Result<ForeignHandle<T>, ShimError> {
    let value = param
        .evaluate()
        .map_err(|code| ShimError::Evaluate { index, code })?;
    let address = value
        .pointer_value()
        .map_err(|code| ShimError::PointerValue { index, code })?;
    Ok(interpret_foreign_handle(address))
}

fn param_at<L: ParamList>(params: &L, index: usize) -> Result<L::Param, ShimError> {
    params
        .get_at(index)
        .map_err(|code| ShimError::ParamAt { index, code })
}

/// Like [`resolve`], but a null out-parameter is simply absent.
fn optional_out<T, L: ParamList>(
    params: &L,
    index: usize,
) -> Result<Option<ForeignHandle<T>>, ShimError> {
    let param = param_at(params, index)?;
    let is_null = param
        .is_null_pointer()
        .map_err(|code| ShimError::IsNullPointer { index, code })?;
    if is_null {
        return Ok(None);
    }
    resolve(&param, index).map(Some)
}

impl<I: HookInstaller> Dispatcher<I> {
    pub fn new(installer: I, inject_debug_device: bool) -> Self {
        Self {
            installer,
            capture: CaptureState::new(),
            inject_debug_device,
        }
    }

    pub fn capture(&self) -> &CaptureState {
        &self.capture
    }

    pub fn installer(&self) -> &I {
        &self.installer
    }

    pub fn on_hook_added<H: HookInfo>(
        &self,
        hook: &H,
        chain_index: u32,
        parameters: &str,
    ) -> Result<(), ShimError> {
        let (name, address) = describe(hook)?;
        log::info!(
            "OnHookAdded called [Hook: {} @ 0x{:X} / Chain: {}]",
            name,
            address,
            chain_index
        );
        if !parameters.is_empty() {
            log::debug!("Custom handler parameters for {}: {}", name, parameters);
        }

        let process = hook.current_process().map_err(ShimError::CurrentProcess)?;
        let pid = process.id().map_err(ShimError::ProcessId)?;
        match self.capture.record_game_pid(pid) {
            PidRecord::Recorded => log::info!("Game process id: {}", pid),
            PidRecord::Unchanged => {}
            PidRecord::Conflict { kept } => {
                log::warn!("Hook reports process {}, keeping game process {}", pid, kept)
            }
        }
        Ok(())
    }

    pub fn on_hook_removed<H: HookInfo>(&self, hook: &H, chain_index: u32) -> Result<(), ShimError> {
        let (name, address) = describe(hook)?;
        log::info!(
            "OnHookRemoved called [Hook: {} @ 0x{:X} / Chain: {}]",
            name,
            address,
            chain_index
        );
        Ok(())
    }

    pub fn on_function_call<H: HookInfo, C: CallInfo>(
        &self,
        hook: &H,
        chain_index: u32,
        call: &C,
    ) -> Result<(), ShimError> {
        let (name, address) = describe(hook)?;
        log::info!(
            "OnFunctionCall called [Hook: {} @ 0x{:X} / Chain: {}]",
            name,
            address,
            chain_index
        );

        let Some(signature) = signature::lookup(&name) else {
            log::trace!("No handler for {}", name);
            return Ok(());
        };

        let params = call.params().map_err(ShimError::Params)?;
        let count = params.count().map_err(ShimError::ParamCount)?;
        if count != signature.arity {
            return Err(ShimError::SignatureMismatch {
                function: signature.name,
                expected: signature.arity,
                actual: count,
            });
        }

        if signature.checks_phase() && call.is_pre_call().map_err(ShimError::IsPreCall)? {
            return self.before_call(signature, &params);
        }
        self.after_call(signature, &params)
    }

    fn before_call<L: ParamList>(
        &self,
        signature: &CallSignature,
        params: &L,
    ) -> Result<(), ShimError> {
        let Some(index) = signature.flags_slot else {
            return Ok(());
        };
        if !self.inject_debug_device {
            return Ok(());
        }

        let param = param_at(params, index)?;
        let flags = param
            .ulong_value()
            .map_err(|code| ShimError::ReadFlags { index, code })?;
        let patched = flags | D3D11_CREATE_DEVICE_DEBUG;
        param
            .set_ulong_value(patched)
            .map_err(|code| ShimError::WriteFlags { index, code })?;

        log::debug!(
            "{}: creation flags 0x{:X} -> 0x{:X}",
            signature.name,
            flags,
            patched
        );
        Ok(())
    }

    fn after_call<L: ParamList>(
        &self,
        signature: &CallSignature,
        params: &L,
    ) -> Result<(), ShimError> {
        match signature.action {
            CaptureAction::DeviceAndSwapChain {
                swap_chain_slot,
                device_slot,
            } => {
                let swap_chain = optional_out(params, swap_chain_slot)?;
                let device = optional_out(params, device_slot)?;
                if let Some(swap_chain) = swap_chain {
                    self.capture.store_swap_chain(swap_chain);
                }
                if let Some(device) = device {
                    self.capture.store_device(device);
                }
                log::info!(
                    "Captured device {:?} and swap chain {:?}",
                    device,
                    swap_chain
                );
                self.installer.install_present_hooks(device, swap_chain);
            }
            CaptureAction::Device { device_slot } => {
                if let Some(device) = optional_out(params, device_slot)? {
                    self.capture.store_device(device);
                    log::info!("Captured device {:?}", device);
                }
            }
            CaptureAction::Factory { factory_slot } => {
                // No null check: the factory out-parameter is mandatory.
                let factory = resolve(&param_at(params, factory_slot)?, factory_slot)?;
                self.capture.store_factory(factory);
                log::info!("Captured factory {:?}", factory);
                self.installer.install_create_swap_chain_hooks(factory);
                self.installer
                    .install_create_swap_chain_for_hwnd_hooks(factory.as_factory2());
            }
        }
        Ok(())
    }
}
