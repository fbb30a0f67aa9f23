//! Log and notice callback system.
//!
//! The crate never prints on its own. Hosts install a log callback for
//! diagnostics and a notice callback for messages meant for the user, such as
//! an export sink being disabled after a write failure.

use std::sync::{Mutex, OnceLock};

/// Log level for debug callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

type NoticeCallback = Box<dyn Fn(&str) + Send + Sync + 'static>;
type LogCallback = Box<dyn Fn(LogLevel, &str) + Send + Sync + 'static>;

fn notice_callback() -> &'static Mutex<Option<NoticeCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<NoticeCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

fn log_callback() -> &'static Mutex<Option<LogCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<LogCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

/// Set the global notice callback.
pub fn set_notice_callback<F>(callback: F)
where
    F: Fn(&str) + Send + Sync + 'static,
{
    if let Ok(mut guard) = notice_callback().lock() {
        *guard = Some(Box::new(callback));
    }
}

/// Show a message to the user through the registered callback.
pub fn emit_notice(message: &str) {
    if let Ok(guard) = notice_callback().lock() {
        if let Some(callback) = guard.as_ref() {
            callback(message);
        }
    }
}

/// Set the global log callback.
pub fn set_log_callback<F>(callback: F)
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    if let Ok(mut guard) = log_callback().lock() {
        *guard = Some(Box::new(callback));
    }
}

/// Emit a log event.
pub fn emit_log(level: LogLevel, message: &str) {
    if let Ok(guard) = log_callback().lock() {
        if let Some(callback) = guard.as_ref() {
            callback(level, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_callback() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let called = Arc::new(AtomicBool::new(false));
        let called_clone = Arc::clone(&called);
        set_notice_callback(move |msg| {
            if msg == "unit-test notice" {
                called_clone.store(true, Ordering::SeqCst);
            }
        });
        emit_notice("unit-test notice");
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_log_callback() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let seen = Arc::new(AtomicBool::new(false));
        let seen_clone = Arc::clone(&seen);
        set_log_callback(move |level, msg| {
            if msg == "unit-test log" {
                assert_eq!(level, LogLevel::Info);
                seen_clone.store(true, Ordering::SeqCst);
            }
        });
        emit_log(LogLevel::Info, "unit-test log");
        assert!(seen.load(Ordering::SeqCst));
    }
}
