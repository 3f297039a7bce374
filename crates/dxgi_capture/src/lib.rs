//! Capture shim loaded into a game by an API-hooking agent.
//!
//! The agent intercepts `CreateDXGIFactory*`, `D3D11CreateDevice` and
//! `D3D11CreateDeviceAndSwapChain` and calls back into this library. We pull
//! the factory, device and swap chain out of those calls and pass them to the
//! module that installs the vtable hooks (`Present`, `CreateSwapChain`,
//! `CreateSwapChainForHwnd`).

pub mod capture;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod host;
pub mod installer;
pub mod logging;
pub mod plugin;
pub mod signature;

#[cfg(target_os = "windows")]
mod ffi;

#[cfg(test)]
mod testing;

pub use capture::{CaptureSnapshot, CaptureState};
pub use dispatch::Dispatcher;
pub use error::{ShimError, Status};
pub use installer::{ExportedInstaller, HookInstaller};
