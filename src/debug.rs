use parking_lot::Mutex;
/// Debug logging for iot-portal
///
/// Every `log::` record and every category macro (`debug_info!`, `debug_log!`, ...)
/// ends up in one file: `iot_portal_debug.log` in the system temp directory.
/// The console driver owns stdout, so nothing is written there. When `RUST_LOG`
/// is set, lines are mirrored to stderr as well.
///
/// Level precedence: `--log-level` flag, then `RUST_LOG`, then the config file
/// (applied later via [`set_level`]).
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn from_filter(filter: log::LevelFilter) -> Self {
        match filter {
            log::LevelFilter::Off => DebugLevel::Off,
            log::LevelFilter::Error | log::LevelFilter::Warn => DebugLevel::Error,
            log::LevelFilter::Info => DebugLevel::Info,
            log::LevelFilter::Debug => DebugLevel::Debug,
            log::LevelFilter::Trace => DebugLevel::Trace,
        }
    }
}

/// Path of the debug log file
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("iot_portal_debug.log")
}

struct DebugLogger {
    level: DebugLevel,
    file: Option<std::fs::File>,
    mirror_stderr: bool,
}

impl DebugLogger {
    fn new(level: DebugLevel, mirror_stderr: bool) -> Self {
        let file = match OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
        {
            Ok(f) => Some(f),
            // Logging must never take the console down with it
            Err(_) => None,
        };

        let mut logger = DebugLogger {
            level,
            file,
            mirror_stderr,
        };
        logger.write_raw(&format!(
            "\n{}\niot-portal debug session started at {} (level={:?})\n{}\n",
            "=".repeat(80),
            get_timestamp(),
            level,
            "=".repeat(80)
        ));
        logger
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }

    fn write_line(&mut self, level_str: &str, category: &str, msg: &str) {
        let line = format!(
            "[{}] [{}] [{}] {}\n",
            get_timestamp(),
            level_str,
            category,
            msg
        );
        self.write_raw(&line);
        if self.mirror_stderr {
            eprint!("{}", line);
        }
    }

    fn log(&mut self, level: DebugLevel, category: &str, msg: &str) {
        if level <= self.level {
            let level_str = match level {
                DebugLevel::Error => "ERROR",
                DebugLevel::Info => "INFO ",
                DebugLevel::Debug => "DEBUG",
                DebugLevel::Trace => "TRACE",
                DebugLevel::Off => return,
            };
            self.write_line(level_str, category, msg);
        }
    }
}

static LOGGER: OnceLock<Mutex<DebugLogger>> = OnceLock::new();

fn get_logger() -> &'static Mutex<DebugLogger> {
    LOGGER.get_or_init(|| Mutex::new(DebugLogger::new(DebugLevel::Off, false)))
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Check if debugging is enabled at given level
pub fn is_enabled(level: DebugLevel) -> bool {
    let logger = get_logger().lock();
    level <= logger.level
}

/// Log a message at specified level
pub fn log(level: DebugLevel, category: &str, msg: &str) {
    let mut logger = get_logger().lock();
    logger.log(level, category, msg);
}

/// Log formatted message
pub fn logf(level: DebugLevel, category: &str, args: fmt::Arguments) {
    if is_enabled(level) {
        log(level, category, &format!("{}", args));
    }
}

/// Routes the `log` facade into the debug file.
struct LogBridge;

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level_str = match record.level() {
            log::Level::Error => "ERROR",
            log::Level::Warn => "WARN ",
            log::Level::Info => "INFO ",
            log::Level::Debug => "DEBUG",
            log::Level::Trace => "TRACE",
        };
        let msg = record.args().to_string();
        get_logger()
            .lock()
            .write_line(level_str, record.target(), &msg);
    }

    fn flush(&self) {
        if let Some(ref mut file) = get_logger().lock().file {
            let _ = file.flush();
        }
    }
}

static BRIDGE: LogBridge = LogBridge;

/// Level requested through `RUST_LOG`, when it names a plain level.
fn rust_log_level() -> Option<log::LevelFilter> {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| value.trim().parse::<log::LevelFilter>().ok())
}

/// Install the `log` bridge.
///
/// `cli_level` wins over `RUST_LOG`. With neither, logging starts at `Warn`
/// until [`set_level`] applies the configured level.
pub fn init_log_bridge(cli_level: Option<log::LevelFilter>) {
    let mirror_stderr = std::env::var_os("RUST_LOG").is_some();
    let level = cli_level
        .or_else(rust_log_level)
        .unwrap_or(log::LevelFilter::Warn);

    if LOGGER
        .set(Mutex::new(DebugLogger::new(
            DebugLevel::from_filter(level),
            mirror_stderr,
        )))
        .is_err()
    {
        // A category macro ran first and opened the file at level Off
        let mut logger = get_logger().lock();
        logger.level = DebugLevel::from_filter(level);
        logger.mirror_stderr = mirror_stderr;
    }

    if log::set_logger(&BRIDGE).is_ok() {
        log::set_max_level(level);
    }
}

/// Apply the configured level unless the CLI or `RUST_LOG` already chose one.
pub fn set_level(config_level: log::LevelFilter, cli_level: Option<log::LevelFilter>) {
    if cli_level.is_some() || rust_log_level().is_some() {
        return;
    }
    log::set_max_level(config_level);
    get_logger().lock().level = DebugLevel::from_filter(config_level);
}

// Convenience macros for logging
#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Error, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Info, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Debug, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Trace, $category, format_args!($($arg)*))
    };
}
