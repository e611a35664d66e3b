use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MedTrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "medication_tracker.db";

/// Overrides the database location.
pub const DB_PATH_ENV: &str = "MEDTRACK_DB";

/// Overrides the HTTP listen address.
pub const BIND_ADDR_ENV: &str = "MEDTRACK_ADDR";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8750";

/// Get the application data directory
/// ~/MedTrack/ on all platforms, falling back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Database path: `$MEDTRACK_DB` when set, else inside the data directory.
pub fn database_path() -> PathBuf {
    match std::env::var(DB_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => app_data_dir().join(DATABASE_FILE),
    }
}

/// Listen address: `$MEDTRACK_ADDR` when set and parseable, else the default.
pub fn bind_addr() -> SocketAddr {
    let fallback = || {
        DEFAULT_BIND_ADDR
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8750)))
    };
    match std::env::var(BIND_ADDR_ENV) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "Ignoring unparseable {BIND_ADDR_ENV}");
            fallback()
        }),
        Err(_) => fallback(),
    }
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "medtrack=debug,medtrack_lib=debug,tower_http=info"
    } else {
        "medtrack=info,medtrack_lib=info,tower_http=warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("MedTrack"));
    }

    #[test]
    fn default_database_lives_in_data_dir() {
        if std::env::var(DB_PATH_ENV).is_err() {
            let path = database_path();
            assert!(path.starts_with(app_data_dir()));
            assert!(path.ends_with(DATABASE_FILE));
        }
    }

    #[test]
    fn default_bind_addr_parses() {
        let addr: SocketAddr = DEFAULT_BIND_ADDR.parse().unwrap();
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn app_name_is_medtrack() {
        assert_eq!(APP_NAME, "MedTrack");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn log_filter_mentions_library() {
        assert!(default_log_filter().contains("medtrack_lib"));
    }
}
