//! `log` backend for the worker.
//!
//! In the browser every record goes to `console.log` / `console.warn` /
//! `console.error`; native builds (tests, tooling) write to stderr.
//! `init` may be called any number of times.

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(target_arch = "wasm32")]
mod console {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console, js_name = log)]
        pub fn log(message: &str);
        #[wasm_bindgen(js_namespace = console, js_name = warn)]
        pub fn warn(message: &str);
        #[wasm_bindgen(js_namespace = console, js_name = error)]
        pub fn error(message: &str);
    }
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record.level(), record.target(), &record.args().to_string());
        emit(record.level(), &line);
    }

    fn flush(&self) {}
}

/// `[hooky] WARN hooky::persistence: message`. The prefix makes the worker's
/// lines easy to filter in devtools.
fn format_record(level: Level, target: &str, message: &str) -> String {
    format!("[hooky] {level} {target}: {message}")
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    match level {
        Level::Error => console::error(line),
        Level::Warn => console::warn(line),
        _ => console::log(line),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{line}");
}

/// Install the console logger. Later calls only adjust the level.
pub fn init(level: LevelFilter) {
    // set_logger fails once a logger is installed; that is the idempotent case.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
