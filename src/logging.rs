use tracing_subscriber::EnvFilter;

/// Workspace crates whose spans and events are shown.
const CRATE_TARGETS: &[&str] = &[
    "dhwgen",
    "dhwgen_ensemble",
    "dhwgen_gev",
    "dhwgen_spatial",
    "dhwgen_stats",
    "dhwgen_trend",
];

/// Level name for a `-v` count: warn, info, debug, then trace.
fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Default filter directive covering every workspace crate.
fn default_directive(verbosity: u8) -> String {
    let level = level_for(verbosity);
    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the `-v` count when set. Event
/// targets are printed from `-vv` upward.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}
