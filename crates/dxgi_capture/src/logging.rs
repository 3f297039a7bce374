//! `log` backend for a shim that lives inside someone else's process.
//!
//! There is no console to write to, so on Windows records go to the debugger
//! output stream where DebugView and attached debuggers pick them up. Other
//! platforms (tests, mostly) get stderr.

use log::{LevelFilter, Log, Metadata, Record};

const LOG_PREFIX: &str = "[DxgiCapture]";

pub struct DebugOutputLogger;

static LOGGER: DebugOutputLogger = DebugOutputLogger;

/// Installs the logger once per process and applies `level`.
///
/// Returns false if some other logger was installed first; the level is
/// still applied.
pub fn init(level: LevelFilter) -> bool {
    let installed = log::set_logger(&LOGGER).is_ok();
    log::set_max_level(level);
    installed
}

fn format_record(record: &Record<'_>) -> String {
    format!("{} {:<5} {}\n", LOG_PREFIX, record.level(), record.args())
}

#[cfg(target_os = "windows")]
fn emit(line: &str) {
    use windows::Win32::System::Diagnostics::Debug::OutputDebugStringA;
    use windows::core::PCSTR;

    // OutputDebugStringA stops at the first NUL.
    let mut bytes: Vec<u8> = line.bytes().map(|b| if b == 0 { b'?' } else { b }).collect();
    bytes.push(0);
    unsafe { OutputDebugStringA(PCSTR(bytes.as_ptr())) };
}

#[cfg(not(target_os = "windows"))]
fn emit(line: &str) {
    eprint!("{line}");
}

impl Log for DebugOutputLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            emit(&format_record(record));
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_format_record_has_prefix_and_level() {
        let line = format_record(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("OnHookAdded called [Hook: {} / Chain: {}]", "X", 0))
                .build(),
        );
        assert_eq!(
            line,
            "[DxgiCapture] WARN  OnHookAdded called [Hook: X / Chain: 0]\n"
        );
    }

    #[test]
    fn test_init_is_repeatable() {
        init(LevelFilter::Debug);
        assert!(!init(LevelFilter::Debug));
    }
}
