use log::LevelFilter;

const SETTING_LOG_LEVEL: &str = "DXGI_CAPTURE_LOG";
const SETTING_DEBUG_DEVICE: &str = "DXGI_CAPTURE_DEBUG_DEVICE";
const SETTING_HOOKS_MODULE: &str = "DXGI_CAPTURE_HOOKS_MODULE";

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;
const DEFAULT_DEBUG_DEVICE: bool = cfg!(debug_assertions);
const DEFAULT_HOOKS_MODULE: &str = "dxgi_capture_hooks.dll";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimConfig {
    pub log_level: LevelFilter,
    /// OR `D3D11_CREATE_DEVICE_DEBUG` into device creation flags pre-call.
    pub inject_debug_device: bool,
    /// Module exporting `HookPresent`, `HookCreateSwapChain` and
    /// `HookCreateSwapChainForHwnd`.
    pub hooks_module: String,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL,
            inject_debug_device: DEFAULT_DEBUG_DEVICE,
            hooks_module: DEFAULT_HOOKS_MODULE.to_owned(),
        }
    }
}

/// A setting that was present but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub key: &'static str,
    pub value: String,
}

impl ShimConfig {
    pub fn from_env() -> (Self, Vec<Rejected>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, keeping the default for any setting
    /// that is unset, empty or unparseable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<Rejected>) {
        let mut config = Self::default();
        let mut rejected = Vec::new();

        let get = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        };

        if let Some((key, value)) = get(SETTING_LOG_LEVEL) {
            match value.parse::<LevelFilter>() {
                Ok(level) => config.log_level = level,
                Err(_) => rejected.push(Rejected { key, value }),
            }
        }

        if let Some((key, value)) = get(SETTING_DEBUG_DEVICE) {
            match parse_bool(&value) {
                Some(enabled) => config.inject_debug_device = enabled,
                None => rejected.push(Rejected { key, value }),
            }
        }

        if let Some((_, value)) = get(SETTING_HOOKS_MODULE) {
            config.hooks_module = value;
        }

        (config, rejected)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
