use {
    crate::Config,
    std::{io::IsTerminal, panic::PanicHookInfo},
    time::macros::format_description,
    tracing_subscriber::{
        EnvFilter,
        Layer,
        fmt::{time::UtcTime, writer::MakeWriterExt as _},
        prelude::*,
        util::SubscriberInitExt,
    },
};

/// Initializes tracing setup that is shared between the binaries.
/// `env_filter` has similar syntax to env_logger. It is documented at
/// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
pub fn initialize(config: &Config) {
    set_tracing_subscriber(config);
    std::panic::set_hook(Box::new(tracing_panic_hook));
}

fn set_tracing_subscriber(config: &Config) {
    // Events at or above this level go to stderr, everything else to stdout.
    let stderr_threshold = config.stderr_threshold.unwrap_or(::tracing::Level::ERROR);

    // The plain and the JSON formatter are different types, so the layer has to
    // be spelled out once per branch.
    macro_rules! fmt_layer {
        ($format:expr) => {{
            $format
                .with_writer(
                    std::io::stderr
                        .with_max_level(stderr_threshold)
                        .or_else(std::io::stdout),
                )
                .with_timer(UtcTime::new(format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
                )))
                .with_filter(EnvFilter::new(&config.env_filter))
        }};
    }

    if config.use_json_format {
        tracing_subscriber::registry()
            .with(fmt_layer!(tracing_subscriber::fmt::layer().json()))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt_layer!(
                tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal())
            ))
            .init();
    }
}

/// Panic hook that prints roughly the same message as the default panic hook
/// but uses tracing:error instead of stderr.
fn tracing_panic_hook(panic: &PanicHookInfo) {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let backtrace = std::backtrace::Backtrace::force_capture();
    ::tracing::error!("thread '{name}' {panic}\nstack backtrace:\n{backtrace}");
}
