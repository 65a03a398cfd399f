use chrono::Local;
use once_cell::sync::Lazy;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Global log file path protected by Mutex
///
/// When None, diagnostics go to stderr. Stdout is reserved for the
/// handshake transcript.
pub static LOG_FILE: Lazy<Mutex<Option<String>>> = Lazy::new(|| Mutex::new(None));

/// Logs a message with timestamp to the configured output
///
/// # Arguments
/// * `message` - The message to log
///
/// # Returns
/// * `io::Result<()>` - Ok on success, Err if writing fails
///
/// # Example
/// ```text
/// // log("Begin of main()").unwrap();
/// ```
pub fn log(message: &str) -> io::Result<()> {
    log_with_role(message, None)
}

/// Logs a message with timestamp and an optional role tag
///
/// Used by the consumer and producer threads so interleaved lines can be
/// told apart.
///
/// # Arguments
/// * `message` - The message to log
/// * `role` - Optional role name, printed as `[role]`
///
/// # Returns
/// * `io::Result<()>` - Ok on success, Err if writing fails
pub fn log_with_role(message: &str, role: Option<&str>) -> io::Result<()> {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let log_message = match role {
        Some(role) => format!("{} [{}] {}\n", timestamp, role, message),
        None => format!("{} {}\n", timestamp, message),
    };

    match &*LOG_FILE.lock().unwrap_or_else(PoisonError::into_inner) {
        Some(log_file) => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;
            file.write_all(log_message.as_bytes())?;
        }
        None => {
            eprint!("{}", log_message);
        }
    }

    Ok(())
}

/// Sets the path for the log file
///
/// Subsequent calls to [`log`] and [`log_with_role`] append to this file.
///
/// # Errors
/// `InvalidInput` if the path is not valid UTF-8
pub fn set_log_file<P: AsRef<Path>>(path: P) -> io::Result<()> {
    let path_str = path.as_ref().to_str().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log file path is not valid UTF-8: {}", path.as_ref().display()),
        )
    })?;
    *LOG_FILE.lock().unwrap_or_else(PoisonError::into_inner) = Some(path_str.to_string());
    Ok(())
}

/// Routes diagnostics back to stderr
pub fn clear_log_file() {
    *LOG_FILE.lock().unwrap_or_else(PoisonError::into_inner) = None;
}
