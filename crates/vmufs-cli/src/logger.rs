use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "error".bright_red(),
            Level::Warn => "warn".bright_yellow(),
            Level::Info => "info".bright_green(),
            Level::Debug => "debug".bright_blue(),
            Level::Trace => "trace".dimmed(),
        };
        eprintln!("{level} {}", record.args());
    }

    fn flush(&self) {}
}

pub fn init(verbose: bool) {
    let filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(filter);
    }
}
