//! Support code for the `mediakit` binary: tracing setup and table output.

use mediakit_core::models::MediaRecord;

/// Initialize tracing for the CLI.
///
/// `RUST_LOG` overrides the default `mediakit=info` filter. `LOG_FORMAT=json`
/// switches to one JSON object per event.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mediakit=info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.compact().with_target(false).init();
    }
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render records as a fixed-width table.
pub fn format_table(records: &[MediaRecord]) -> String {
    let mut out = format!(
        "{:<36}  {:<8}  {:<6}  {:>10}  {:<32}  {}\n",
        "ID", "TYPE", "ACTIVE", "SIZE", "ORIGINAL NAME", "STORAGE PATH"
    );
    for record in records {
        out.push_str(&format!(
            "{:<36}  {:<8}  {:<6}  {:>10}  {:<32}  {}\n",
            record.id,
            record.media_type,
            if record.is_active { "yes" } else { "no" },
            record.metadata.size,
            truncate_string(&record.metadata.original_name, 32),
            record.storage_path,
        ));
    }
    out
}
