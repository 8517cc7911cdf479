/// Centralized logging macros for the DriftTerm core.
///
/// Platform-specific output (web_sys::console on WASM, eprintln! on
/// native); debug and warn levels are stripped from release builds.
///
/// Crates using these macros on wasm32 need `web-sys` with the `console`
/// feature in scope.
///
/// # Example
/// ```
/// use core_types::term_debug;
/// term_debug!("session state: {:?} -> {:?}", "Idle", "Opening");
/// ```
#[macro_export]
macro_rules! term_debug {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::log_1(&format!($($arg)*).into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("[DEBUG] {}", format!($($arg)*));
        }
    };
}

/// Log a recoverable or unexpected condition (debug builds only).
#[macro_export]
macro_rules! term_warn {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::warn_1(&format!($($arg)*).into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("[WARN] {}", format!($($arg)*));
        }
    };
}

/// Log a critical error (always compiled, even in release).
#[macro_export]
macro_rules! term_error {
    ($($arg:tt)*) => {
        {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::error_1(&format!($($arg)*).into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("[ERROR] {}", format!($($arg)*));
        }
    };
}
