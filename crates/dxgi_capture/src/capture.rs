//! Last-seen interface handles and the owning game process.
//!
//! Callbacks arrive on arbitrary game threads without any ordering between
//! them. Each slot is a single atomic word: concurrent captures race and the
//! last store wins. The installer never reads these slots back; it is handed
//! the values extracted in its own callback, so it always sees a consistent
//! pair even while another thread overwrites the slots.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::handle::{
    DeviceHandle, FactoryHandle, ForeignHandle, SwapChainHandle, interpret_foreign_handle,
};

#[derive(Default)]
pub struct CaptureState {
    factory: AtomicUsize,
    device: AtomicUsize,
    swap_chain: AtomicUsize,
    game_pid: OnceLock<u32>,
}

/// Point-in-time copy of [`CaptureState`]. Slots never written are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureSnapshot {
    pub factory: Option<FactoryHandle>,
    pub device: Option<DeviceHandle>,
    pub swap_chain: Option<SwapChainHandle>,
    pub game_pid: Option<u32>,
}

/// Outcome of reporting the owning process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidRecord {
    /// First report in this process.
    Recorded,
    /// Same id as the one already held.
    Unchanged,
    /// A different id; the first one is kept.
    Conflict { kept: u32 },
}

fn load<T>(slot: &AtomicUsize) -> Option<ForeignHandle<T>> {
    match slot.load(Ordering::Acquire) {
        0 => None,
        address => Some(interpret_foreign_handle(address)),
    }
}

impl CaptureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_factory(&self, factory: FactoryHandle) {
        self.factory.store(factory.address(), Ordering::Release);
    }

    pub fn store_device(&self, device: DeviceHandle) {
        self.device.store(device.address(), Ordering::Release);
    }

    pub fn store_swap_chain(&self, swap_chain: SwapChainHandle) {
        self.swap_chain.store(swap_chain.address(), Ordering::Release);
    }

    pub fn factory(&self) -> Option<FactoryHandle> {
        load(&self.factory)
    }

    pub fn device(&self) -> Option<DeviceHandle> {
        load(&self.device)
    }

    pub fn swap_chain(&self) -> Option<SwapChainHandle> {
        load(&self.swap_chain)
    }

    pub fn record_game_pid(&self, pid: u32) -> PidRecord {
        match self.game_pid.get() {
            Some(&kept) if kept == pid => PidRecord::Unchanged,
            Some(&kept) => PidRecord::Conflict { kept },
            None => match self.game_pid.set(pid) {
                Ok(()) => PidRecord::Recorded,
                // Another thread won the first report.
                Err(_) => match self.game_pid.get() {
                    Some(&kept) if kept != pid => PidRecord::Conflict { kept },
                    _ => PidRecord::Unchanged,
                },
            },
        }
    }

    pub fn game_pid(&self) -> Option<u32> {
        self.game_pid.get().copied()
    }

    pub fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            factory: self.factory(),
            device: self.device(),
            swap_chain: self.swap_chain(),
            game_pid: self.game_pid(),
        }
    }
}
