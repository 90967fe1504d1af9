//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `valentine_core` linkage.
//! - Print the theme and decoration registries for quick local checks.

use valentine_core::logging::{LogLevel, LogSink};
use valentine_core::model::theme::{decorations, themes};
use valentine_core::{init_logging_with, AppConfig};

fn main() {
    let config = AppConfig::from_env();
    let level = config
        .log_level
        .as_deref()
        .and_then(|raw| LogLevel::parse(raw).ok())
        .unwrap_or_else(LogLevel::build_default);
    if let Err(err) = init_logging_with(level, LogSink::Stderr) {
        eprintln!("logging disabled: {err}");
    }

    println!("valentine_core ping={}", valentine_core::ping());
    println!("valentine_core version={}", valentine_core::core_version());
    println!("db_path={}", config.db_path.display());
    for theme in themes() {
        println!("theme id={} name={} emoji={}", theme.id, theme.name, theme.emoji);
    }
    for decoration in decorations() {
        println!(
            "decoration id={} name={} symbols={}",
            decoration.id,
            decoration.name,
            decoration.effective_symbols().join(" ")
        );
    }
}
