//! Argument layouts of the exports we intercept.
//!
//! Slot indices are zero-based positions in the native prototype. If a
//! prototype changes, this table is the only thing to edit.

/// `D3D11_CREATE_DEVICE_DEBUG`
pub const D3D11_CREATE_DEVICE_DEBUG: u32 = 0x2;

/// What the dispatcher does with a post-call observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureAction {
    /// Capture swap chain and device, then install the `Present` hooks.
    DeviceAndSwapChain { swap_chain_slot: usize, device_slot: usize },
    /// Capture the device only.
    Device { device_slot: usize },
    /// Capture the factory and install the swap-chain creation hooks.
    ///
    /// Runs in both phases and resolves the slot without a null check.
    Factory { factory_slot: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSignature {
    /// Qualified name as the host reports it.
    pub name: &'static str,
    pub arity: usize,
    /// `Flags` argument that receives the debug-device bit pre-call.
    pub flags_slot: Option<usize>,
    pub action: CaptureAction,
}

impl CallSignature {
    /// Whether the phase decides what happens.
    ///
    /// Factory creation is observed regardless of phase.
    pub fn checks_phase(&self) -> bool {
        !matches!(self.action, CaptureAction::Factory { .. })
    }
}

// HRESULT D3D11CreateDeviceAndSwapChain(
//     IDXGIAdapter*, D3D_DRIVER_TYPE, HMODULE, UINT Flags,
//     const D3D_FEATURE_LEVEL*, UINT, UINT SDKVersion,
//     const DXGI_SWAP_CHAIN_DESC*, IDXGISwapChain**, ID3D11Device**,
//     D3D_FEATURE_LEVEL*, ID3D11DeviceContext**)
const D3D11_CREATE_DEVICE_AND_SWAP_CHAIN: CallSignature = CallSignature {
    name: "D3D11.DLL!D3D11CreateDeviceAndSwapChain",
    arity: 12,
    flags_slot: Some(3),
    action: CaptureAction::DeviceAndSwapChain {
        swap_chain_slot: 8,
        device_slot: 9,
    },
};

// HRESULT D3D11CreateDevice(
//     IDXGIAdapter*, D3D_DRIVER_TYPE, HMODULE, UINT Flags,
//     const D3D_FEATURE_LEVEL*, UINT, UINT SDKVersion,
//     ID3D11Device**, D3D_FEATURE_LEVEL*, ID3D11DeviceContext**)
const D3D11_CREATE_DEVICE: CallSignature = CallSignature {
    name: "D3D11.DLL!D3D11CreateDevice",
    arity: 10,
    flags_slot: Some(3),
    action: CaptureAction::Device { device_slot: 7 },
};

// HRESULT CreateDXGIFactory(REFIID riid, void** ppFactory)
const CREATE_DXGI_FACTORY: CallSignature = CallSignature {
    name: "DXGI.DLL!CreateDXGIFactory",
    arity: 2,
    flags_slot: None,
    action: CaptureAction::Factory { factory_slot: 1 },
};

// HRESULT CreateDXGIFactory1(REFIID riid, void** ppFactory)
const CREATE_DXGI_FACTORY1: CallSignature = CallSignature {
    name: "DXGI.DLL!CreateDXGIFactory1",
    arity: 2,
    flags_slot: None,
    action: CaptureAction::Factory { factory_slot: 1 },
};

pub const SIGNATURES: &[CallSignature] = &[
    D3D11_CREATE_DEVICE_AND_SWAP_CHAIN,
    D3D11_CREATE_DEVICE,
    CREATE_DXGI_FACTORY,
    CREATE_DXGI_FACTORY1,
];

/// Exact, case-sensitive lookup by qualified name.
pub fn lookup(name: &str) -> Option<&'static CallSignature> {
    SIGNATURES.iter().find(|sig| sig.name == name)
}
