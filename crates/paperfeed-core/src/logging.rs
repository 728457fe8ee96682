//! Log output that stays clear of the fetch bar

use std::fmt::Arguments;

use indicatif::MultiProgress;
use log::Level;

/// Noisy dependency modules capped at `warn` unless `RUST_LOG` says otherwise
const QUIET_MODULES: &str = "hyper=warn,hyper_util=warn,reqwest=warn";

fn ansi_color(level: Level) -> u8 {
    match level {
        Level::Error => 31,
        Level::Warn => 33,
        Level::Info => 32,
        Level::Debug => 36,
        Level::Trace => 35,
    }
}

/// `[LEVEL] message` with the label padded to five columns
fn render(level: Level, args: &Arguments<'_>, color: bool) -> String {
    let name = level.as_str();
    if color {
        format!("[\x1b[{}m{name:<5}\x1b[0m] {args}", ansi_color(level))
    } else {
        format!("[{name:<5}] {args}")
    }
}

/// Default filter string for the given verbosity
fn default_filter(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("{level},{QUIET_MODULES}")
}

/// Routes records through `MultiProgress::suspend` so a live bar is redrawn
/// below each line instead of being overwritten.
struct BarLogger {
    filter: env_logger::Logger,
    bars: MultiProgress,
}

impl log::Log for BarLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.filter.matches(record) {
            return;
        }
        let line = render(record.level(), record.args(), true);
        self.bars.suspend(|| eprintln!("{line}"));
    }

    fn flush(&self) {}
}

/// `RUST_LOG` (or the default filter), with `--debug` layered on top
fn builder(debug: bool) -> env_logger::Builder {
    let env = env_logger::Env::default().default_filter_or(default_filter(false));
    let mut builder = env_logger::Builder::from_env(env);
    if debug {
        builder.parse_filters(&default_filter(true));
    }
    builder
}

/// Install the global logger.
///
/// Pass the progress bars when stderr is a terminal; otherwise records are
/// written as plain uncolored lines for log collectors.
pub fn init_logging(debug: bool, bars: Option<&MultiProgress>) {
    use std::io::Write;

    let Some(bars) = bars else {
        let _ = builder(debug)
            .format(|buf, record| writeln!(buf, "{}", render(record.level(), record.args(), false)))
            .try_init();
        return;
    };

    let filter = builder(debug).build();
    let max_level = filter.filter();
    let logger = BarLogger {
        filter,
        bars: bars.clone(),
    };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(max_level);
    }
}
