use tracing_subscriber::EnvFilter;

/// Errors only by default so the terminal UI stays clean; `-v` raises to
/// debug (with hyper's connection chatter suppressed), `-vv` to trace.
/// `RUST_LOG` wins when set.
pub fn init(verbose_level: u8) {
    let default_filter = match verbose_level {
        0 => "error",
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
