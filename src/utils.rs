use crate::constants::DEFAULT_PORT;
use std::str::FromStr;

/// Read an environment variable and parse it, falling back to `default`
/// when unset or unparsable
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Read a boolean flag ("1", "true", "yes", "on" / "0", "false", "no", "off")
pub fn env_bool_or(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Get server port from PORT or use default
pub fn get_port() -> u16 {
    env_or("PORT", DEFAULT_PORT)
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Initialize tracing with `RUST_LOG` support (default: info)
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
