//! Process-wide plugin lifecycle.

use std::sync::OnceLock;

use crate::capture::CaptureSnapshot;
use crate::config::ShimConfig;
use crate::dispatch::Dispatcher;
use crate::error::ShimError;
use crate::installer::ExportedInstaller;
use crate::logging;

pub type PluginDispatcher = Dispatcher<ExportedInstaller>;

static DISPATCHER: OnceLock<PluginDispatcher> = OnceLock::new();

/// The dispatcher published by [`on_load`].
pub fn dispatcher() -> Result<&'static PluginDispatcher, ShimError> {
    DISPATCHER.get().ok_or(ShimError::NotLoaded)
}

/// Captured handles so far, if the shim is loaded.
pub fn snapshot() -> Option<CaptureSnapshot> {
    DISPATCHER.get().map(|d| d.capture().snapshot())
}

pub fn on_load() -> Result<(), ShimError> {
    if DISPATCHER.get().is_some() {
        log::debug!("OnLoad called again, already loaded");
        return Ok(());
    }

    let (config, rejected) = ShimConfig::from_env();
    logging::init(config.log_level);
    log::info!("OnLoad called");
    for setting in rejected {
        log::warn!("Ignoring {}={:?}, using default", setting.key, setting.value);
    }

    prepare_process()?;

    let installer = ExportedInstaller::load(&config.hooks_module)?;
    if DISPATCHER
        .set(Dispatcher::new(installer, config.inject_debug_device))
        .is_err()
    {
        log::debug!("Concurrent OnLoad won, keeping its dispatcher");
    }

    log::info!(
        "Loaded (hooks module: {}, debug device: {})",
        config.hooks_module,
        config.inject_debug_device
    );
    Ok(())
}

pub fn on_unload() {
    log::info!("OnUnload called");
}

/// Makes COM usable on the agent's thread and keeps `d3d11.dll` mapped so
/// the exports we are hooked on outlive any `FreeLibrary` by the game.
#[cfg(target_os = "windows")]
fn prepare_process() -> Result<(), ShimError> {
    use windows::Win32::Foundation::RPC_E_CHANGED_MODE;
    use windows::Win32::System::Com::{COINIT_MULTITHREADED, CoInitializeEx};

    use crate::host::HostCode;

    let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
    if hr == RPC_E_CHANGED_MODE {
        log::warn!("Thread already uses a single-threaded apartment, keeping it");
    } else if hr.is_err() {
        return Err(ShimError::ComInit(HostCode(hr.0)));
    }

    let d3d11 = unsafe { libloading::Library::new("d3d11.dll") }.map_err(|source| {
        ShimError::ModuleLoad {
            module: "d3d11.dll".to_owned(),
            source,
        }
    })?;
    std::mem::forget(d3d11);
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn prepare_process() -> Result<(), ShimError> {
    Ok(())
}
