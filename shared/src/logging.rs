//! Shared logging utilities for consistent tracing across the runner

/// Crates whose events are shown at the requested level
const OWN_TARGETS: [&str; 2] = ["acceptance", "shared"];

/// Build the filter directive string for the given base level
pub fn filter_directives(log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");

    let mut directives: Vec<String> = OWN_TARGETS
        .iter()
        .map(|target| format!("{target}={base_level}"))
        .collect();
    directives.push("reqwest=warn".to_string());
    directives.push("hyper=warn".to_string());
    directives.join(",")
}

/// Initialize the stdout tracing subscriber
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let directives = filter_directives(log_level);

    let _ = fmt()
        .with_env_filter(EnvFilter::new(&directives))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    tracing::debug!("📊 Log filter: {directives}");
}
