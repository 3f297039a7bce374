fn main() {
    // The agent resolves the plugin callbacks by their plain names. On 32-bit
    // Windows, `extern "system"` symbols carry stdcall decoration
    // (`_OnLoad@0`), so alias each callback to its undecorated name.
    // Build scripts are compiled for the host, so use Cargo's target cfg env
    // vars instead of #[cfg(...)] to detect the compilation target.
    let target_os = std::env::var("CARGO_CFG_TARGET_OS");
    let target_arch = std::env::var("CARGO_CFG_TARGET_ARCH");
    if target_os.as_deref() == Ok("windows") && target_arch.as_deref() == Ok("x86") {
        for (name, arg_bytes) in [
            ("OnLoad", 0),
            ("OnUnload", 0),
            ("OnHookAdded", 12),
            ("OnHookRemoved", 8),
            ("OnFunctionCall", 12),
        ] {
            println!("cargo:rustc-cdylib-link-arg=/EXPORT:{name}=_{name}@{arg_bytes}");
        }
    }
}
