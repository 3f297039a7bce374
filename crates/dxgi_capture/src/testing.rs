//! Scriptable stand-ins for the host accessors and the hook installer.

use std::cell::RefCell;
use std::rc::Rc;

use crate::handle::{DeviceHandle, Factory2Handle, FactoryHandle, SwapChainHandle};
use crate::host::{CallInfo, HookInfo, HostCode, HostProcess, HostResult, Param, ParamList};
use crate::installer::HookInstaller;

pub const FAIL_CODE: HostCode = HostCode(0x8002_0009_u32 as i32);

/// Accessor that returns [`FAIL_CODE`] instead of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    FunctionName,
    Address,
    CurrentProcess,
    ProcessId,
    IsPreCall,
    Params,
    Count,
    GetAt(usize),
    IsNullPointer(usize),
    Evaluate(usize),
    PointerValue(usize),
    ULongValue(usize),
    SetULongValue(usize),
}

fn check(fail: Option<FailPoint>, point: FailPoint) -> HostResult<()> {
    if fail == Some(point) {
        Err(FAIL_CODE)
    } else {
        Ok(())
    }
}

pub struct FakeHook {
    pub name: String,
    pub address: usize,
    pub pid: u32,
    pub fail: Option<FailPoint>,
}

impl FakeHook {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            address: 0x7FFA_1000,
            pid: 4321,
            fail: None,
        }
    }

    pub fn failing(mut self, point: FailPoint) -> Self {
        self.fail = Some(point);
        self
    }
}

pub struct FakeProcess {
    pid: u32,
    fail: Option<FailPoint>,
}

impl HostProcess for FakeProcess {
    fn id(&self) -> HostResult<u32> {
        check(self.fail, FailPoint::ProcessId)?;
        Ok(self.pid)
    }
}

impl HookInfo for FakeHook {
    type Process = FakeProcess;

    fn function_name(&self) -> HostResult<String> {
        check(self.fail, FailPoint::FunctionName)?;
        Ok(self.name.clone())
    }

    fn address(&self) -> HostResult<usize> {
        check(self.fail, FailPoint::Address)?;
        Ok(self.address)
    }

    fn current_process(&self) -> HostResult<FakeProcess> {
        check(self.fail, FailPoint::CurrentProcess)?;
        Ok(FakeProcess {
            pid: self.pid,
            fail: self.fail,
        })
    }
}

/// Contents of one argument slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Null pointer argument.
    Null,
    /// Non-null out-parameter; evaluating it yields this address.
    Out(usize),
    /// Plain integer argument.
    Value(u32),
}

/// Every host access made through a [`FakeCall`], in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    IsPreCall,
    Params,
    Count,
    GetAt(usize),
    Evaluate(usize),
    SetULongValue(usize, u32),
}

#[derive(Clone)]
struct Shared {
    slots: Rc<RefCell<Vec<Slot>>>,
    journal: Rc<RefCell<Vec<Access>>>,
    fail: Option<FailPoint>,
}

impl Shared {
    fn note(&self, access: Access) {
        self.journal.borrow_mut().push(access);
    }
}

pub struct FakeCall {
    pre_call: bool,
    count: Option<usize>,
    shared: Shared,
}

/// `arity` null slots with `set` applied on top.
pub fn slots(arity: usize, set: &[(usize, Slot)]) -> Vec<Slot> {
    let mut slots = vec![Slot::Null; arity];
    for &(index, slot) in set {
        slots[index] = slot;
    }
    slots
}

impl FakeCall {
    pub fn pre(slots: Vec<Slot>) -> Self {
        Self::new(true, slots)
    }

    pub fn post(slots: Vec<Slot>) -> Self {
        Self::new(false, slots)
    }

    fn new(pre_call: bool, slots: Vec<Slot>) -> Self {
        Self {
            pre_call,
            count: None,
            shared: Shared {
                slots: Rc::new(RefCell::new(slots)),
                journal: Rc::new(RefCell::new(Vec::new())),
                fail: None,
            },
        }
    }

    pub fn failing(mut self, point: FailPoint) -> Self {
        self.shared.fail = Some(point);
        self
    }

    /// Reports `count` parameters regardless of the slots present.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn slot(&self, index: usize) -> Slot {
        self.shared.slots.borrow()[index]
    }

    pub fn journal(&self) -> Vec<Access> {
        self.shared.journal.borrow().clone()
    }

    /// Slots fetched with `GetAt`, in order.
    pub fn fetched_slots(&self) -> Vec<usize> {
        self.journal()
            .into_iter()
            .filter_map(|a| match a {
                Access::GetAt(i) => Some(i),
                _ => None,
            })
            .collect()
    }
}

impl CallInfo for FakeCall {
    type Params = FakeParams;

    fn is_pre_call(&self) -> HostResult<bool> {
        self.shared.note(Access::IsPreCall);
        check(self.shared.fail, FailPoint::IsPreCall)?;
        Ok(self.pre_call)
    }

    fn params(&self) -> HostResult<FakeParams> {
        self.shared.note(Access::Params);
        check(self.shared.fail, FailPoint::Params)?;
        Ok(FakeParams {
            count: self.count,
            shared: self.shared.clone(),
        })
    }
}

pub struct FakeParams {
    count: Option<usize>,
    shared: Shared,
}

impl ParamList for FakeParams {
    type Param = FakeParam;

    fn count(&self) -> HostResult<usize> {
        self.shared.note(Access::Count);
        check(self.shared.fail, FailPoint::Count)?;
        Ok(self.count.unwrap_or_else(|| self.shared.slots.borrow().len()))
    }

    fn get_at(&self, index: usize) -> HostResult<FakeParam> {
        self.shared.note(Access::GetAt(index));
        check(self.shared.fail, FailPoint::GetAt(index))?;
        if index >= self.shared.slots.borrow().len() {
            return Err(FAIL_CODE);
        }
        Ok(FakeParam {
            index,
            evaluated: false,
            shared: self.shared.clone(),
        })
    }
}

pub struct FakeParam {
    index: usize,
    evaluated: bool,
    shared: Shared,
}

impl FakeParam {
    fn slot(&self) -> Slot {
        self.shared.slots.borrow()[self.index]
    }
}

impl Param for FakeParam {
    fn is_null_pointer(&self) -> HostResult<bool> {
        check(self.shared.fail, FailPoint::IsNullPointer(self.index))?;
        Ok(self.slot() == Slot::Null)
    }

    fn evaluate(&self) -> HostResult<FakeParam> {
        self.shared.note(Access::Evaluate(self.index));
        check(self.shared.fail, FailPoint::Evaluate(self.index))?;
        Ok(FakeParam {
            index: self.index,
            evaluated: true,
            shared: self.shared.clone(),
        })
    }

    fn pointer_value(&self) -> HostResult<usize> {
        check(self.shared.fail, FailPoint::PointerValue(self.index))?;
        Ok(match (self.evaluated, self.slot()) {
            (true, Slot::Out(address)) => address,
            // Address of the out-variable itself, never what a correct
            // caller wants.
            (false, Slot::Out(_)) => 0xBAD0_0000 + self.index,
            (_, Slot::Value(v)) => v as usize,
            (_, Slot::Null) => 0,
        })
    }

    fn ulong_value(&self) -> HostResult<u32> {
        check(self.shared.fail, FailPoint::ULongValue(self.index))?;
        Ok(match self.slot() {
            Slot::Value(v) => v,
            _ => 0,
        })
    }

    fn set_ulong_value(&self, value: u32) -> HostResult<()> {
        self.shared.note(Access::SetULongValue(self.index, value));
        check(self.shared.fail, FailPoint::SetULongValue(self.index))?;
        self.shared.slots.borrow_mut()[self.index] = Slot::Value(value);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installed {
    Present {
        device: Option<usize>,
        swap_chain: Option<usize>,
    },
    CreateSwapChain(usize),
    CreateSwapChainForHwnd(usize),
}

#[derive(Default)]
pub struct RecordingInstaller {
    calls: RefCell<Vec<Installed>>,
}

impl RecordingInstaller {
    pub fn calls(&self) -> Vec<Installed> {
        self.calls.borrow().clone()
    }
}

impl HookInstaller for RecordingInstaller {
    fn install_present_hooks(&self, device: Option<DeviceHandle>, swap_chain: Option<SwapChainHandle>) {
        self.calls.borrow_mut().push(Installed::Present {
            device: device.map(|d| d.address()),
            swap_chain: swap_chain.map(|s| s.address()),
        });
    }

    fn install_create_swap_chain_hooks(&self, factory: FactoryHandle) {
        self.calls
            .borrow_mut()
            .push(Installed::CreateSwapChain(factory.address()));
    }

    fn install_create_swap_chain_for_hwnd_hooks(&self, factory: Factory2Handle) {
        self.calls
            .borrow_mut()
            .push(Installed::CreateSwapChainForHwnd(factory.address()));
    }
}
