//! Logging macros shared across the crate.
//!
//! All diagnostics go through `tracing`; the binary decides where they end up.

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        {
            tracing::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        {
            tracing::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        {
            tracing::error!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        {
            tracing::debug!($($arg)*);
        }
    };
}
