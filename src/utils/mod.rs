pub mod format;

use std::{env, path::PathBuf, sync::Once};

use cashbook_core::Clock;
use chrono::{DateTime, Utc};
use tracing_subscriber::{fmt, EnvFilter};

/// Overrides the application data directory (`~/.cashbook` by default).
pub const HOME_ENV: &str = "CASHBOOK_HOME";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber. Logs go to stderr so command
/// output on stdout stays clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        for directive in ["cashbook=info", "cashbook_core=info", "cashbook_storage_json=info"] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Resolves the application data directory, honouring `CASHBOOK_HOME`.
pub fn app_home() -> PathBuf {
    match env::var_os(HOME_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => cashbook_config::default_app_home(),
    }
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
