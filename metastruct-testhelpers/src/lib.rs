#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
//! Shared setup for metastruct tests: a tracing subscriber filtered by
//! `METASTRUCT_LOG` and colored panic backtraces.

use std::sync::LazyLock;
use std::time::Instant;

use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding a `Targets` directive string, such as
/// `metastruct_core=debug`
pub const LOG_ENV: &str = "METASTRUCT_LOG";

static STARTED: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Prints time since the first `setup()` call instead of wall-clock time.
struct SinceSetup;

impl FormatTime for SinceSetup {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = STARTED.elapsed();
        write!(w, "{:3}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

fn is_harness_frame(name: &str) -> bool {
    const PREFIXES: &[&str] = &[
        "test::run_test",
        "test::__rust_begin_short_backtrace",
        "std::panicking::",
        "std::panic::",
        "core::panicking::",
        "core::ops::function::FnOnce::call_once",
        "std::sys::backtrace::",
        "std::thread::Builder::spawn_unchecked_",
        "__pthread",
    ];
    PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn log_filter() -> Targets {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| directives.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(tracing::Level::TRACE))
}

static INSTALLED: LazyLock<()> = LazyLock::new(|| {
    LazyLock::force(&STARTED);

    color_backtrace::BacktracePrinter::new()
        .verbosity(color_backtrace::Verbosity::Medium)
        .add_frame_filter(Box::new(|frames| {
            frames.retain(|frame| frame.name.as_deref().is_none_or(|name| !is_harness_frame(name)));
        }))
        .install(Box::new(termcolor::StandardStream::stderr(
            termcolor::ColorChoice::Auto,
        )));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(SinceSetup)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_test_writer()
                .compact(),
        )
        .with(log_filter())
        .try_init()
        .ok();
});

/// Installs the test subscriber and panic printer.
///
/// Safe to call from every test; only the first call in a process does
/// anything.
pub fn setup() {
    LazyLock::force(&INSTALLED);
}
