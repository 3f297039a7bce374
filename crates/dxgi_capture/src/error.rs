use thiserror::Error;

use crate::host::HostCode;

/// HRESULT-shaped status returned across the plugin ABI.
///
/// Non-negative means success. Anything negative makes the host remove all
/// hooks and unload the shim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub i32);

impl Status {
    pub const OK: Status = Status(0);
    pub const E_FAIL: Status = Status(0x8000_4005_u32 as i32);
    pub const E_INVALIDARG: Status = Status(0x8007_0057_u32 as i32);
    pub const E_UNEXPECTED: Status = Status(0x8000_FFFF_u32 as i32);
    pub const E_POINTER: Status = Status(0x8000_4003_u32 as i32);

    pub fn is_success(self) -> bool {
        self.0 >= 0
    }
}

impl From<Result<(), ShimError>> for Status {
    fn from(result: Result<(), ShimError>) -> Self {
        match result {
            Ok(()) => Status::OK,
            Err(e) => e.status(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ShimError {
    #[error("failed to read hooked function name ({0})")]
    FunctionName(HostCode),

    #[error("failed to read hooked function address ({0})")]
    Address(HostCode),

    #[error("failed to get hook owner process ({0})")]
    CurrentProcess(HostCode),

    #[error("failed to read process id ({0})")]
    ProcessId(HostCode),

    #[error("failed to read call phase ({0})")]
    IsPreCall(HostCode),

    #[error("failed to get parameter enumerator ({0})")]
    Params(HostCode),

    #[error("failed to read parameter count ({0})")]
    ParamCount(HostCode),

    #[error("failed to get parameter {index} ({code})")]
    ParamAt { index: usize, code: HostCode },

    #[error("failed null check on parameter {index} ({code})")]
    IsNullPointer { index: usize, code: HostCode },

    #[error("failed to evaluate parameter {index} ({code})")]
    Evaluate { index: usize, code: HostCode },

    #[error("failed to read pointer value of parameter {index} ({code})")]
    PointerValue { index: usize, code: HostCode },

    #[error("failed to read flags parameter {index} ({code})")]
    ReadFlags { index: usize, code: HostCode },

    #[error("failed to write flags parameter {index} ({code})")]
    WriteFlags { index: usize, code: HostCode },

    #[error("{function} reported {actual} parameters, expected {expected}")]
    SignatureMismatch {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("COM initialization failed ({0})")]
    ComInit(HostCode),

    #[error("failed to load module '{module}': {source}")]
    ModuleLoad {
        module: String,
        #[source]
        source: libloading::Error,
    },

    #[error("module '{module}' does not export '{symbol}': {source}")]
    MissingExport {
        module: String,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("host passed a null {0}")]
    NullHostObject(&'static str),

    #[error("callback received before OnLoad completed")]
    NotLoaded,
}

impl ShimError {
    /// Host code behind an accessor failure, if this error came from one.
    pub fn host_code(&self) -> Option<HostCode> {
        match self {
            ShimError::FunctionName(code)
            | ShimError::Address(code)
            | ShimError::CurrentProcess(code)
            | ShimError::ProcessId(code)
            | ShimError::IsPreCall(code)
            | ShimError::Params(code)
            | ShimError::ParamCount(code)
            | ShimError::ComInit(code) => Some(*code),
            ShimError::ParamAt { code, .. }
            | ShimError::IsNullPointer { code, .. }
            | ShimError::Evaluate { code, .. }
            | ShimError::PointerValue { code, .. }
            | ShimError::ReadFlags { code, .. }
            | ShimError::WriteFlags { code, .. } => Some(*code),
            ShimError::SignatureMismatch { .. }
            | ShimError::ModuleLoad { .. }
            | ShimError::MissingExport { .. }
            | ShimError::NullHostObject(_)
            | ShimError::NotLoaded => None,
        }
    }

    /// Status reported to the host. Always negative.
    pub fn status(&self) -> Status {
        match self {
            ShimError::SignatureMismatch { .. } => Status::E_INVALIDARG,
            ShimError::NotLoaded => Status::E_UNEXPECTED,
            ShimError::NullHostObject(_) => Status::E_POINTER,
            _ => match self.host_code() {
                Some(HostCode(code)) if code < 0 => Status(code),
                _ => Status::E_FAIL,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_failure_code_is_passed_through() {
        let code = HostCode(0x8002_0006_u32 as i32);
        let err = ShimError::ParamAt { index: 8, code };
        assert_eq!(err.host_code(), Some(code));
        assert_eq!(err.status(), Status(code.0));
    }

    #[test]
    fn test_non_negative_host_code_becomes_e_fail() {
        // S_FALSE from an accessor is still a failure for us.
        let err = ShimError::Evaluate {
            index: 1,
            code: HostCode(1),
        };
        assert_eq!(err.status(), Status::E_FAIL);
    }

    #[test]
    fn test_shim_only_errors_have_fixed_statuses() {
        let mismatch = ShimError::SignatureMismatch {
            function: "D3D11.DLL!D3D11CreateDevice",
            expected: 10,
            actual: 9,
        };
        assert_eq!(mismatch.status(), Status::E_INVALIDARG);
        assert_eq!(ShimError::NotLoaded.status(), Status::E_UNEXPECTED);
        assert!(mismatch.host_code().is_none());
    }

    #[test]
    fn test_every_error_status_is_negative() {
        let errors = [
            ShimError::FunctionName(HostCode(0)),
            ShimError::ProcessId(HostCode(-1)),
            ShimError::NotLoaded,
            ShimError::NullHostObject("call info"),
            ShimError::WriteFlags {
                index: 3,
                code: HostCode(0x8000_4005_u32 as i32),
            },
        ];
        for err in errors {
            assert!(!err.status().is_success(), "{err}");
        }
    }

    #[test]
    fn test_status_from_result() {
        assert_eq!(Status::from(Ok(())), Status::OK);
        assert_eq!(
            Status::from(Err(ShimError::NotLoaded)),
            Status::E_UNEXPECTED
        );
    }

    #[test]
    fn test_error_messages_name_the_slot() {
        let err = ShimError::PointerValue {
            index: 9,
            code: HostCode(0x8000_4005_u32 as i32),
        };
        assert_eq!(
            err.to_string(),
            "failed to read pointer value of parameter 9 (0x80004005)"
        );
    }
}
