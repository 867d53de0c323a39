//! Command-line configuration.
//!
//! # Responsibility
//! - Parse process flags and resolve defaults into absolute settings.
//!
//! # Invariants
//! - `AppConfig::log_dir` is always absolute (logging rejects relative dirs).

use clap::Parser;
use std::path::{Path, PathBuf};
use todo_core::default_log_level;

/// Database file used when `--db` is not given.
pub const DEFAULT_DB_FILE: &str = "toDoTasks.sqlite";
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Terminal to-do list backed by SQLite")]
pub struct Cli {
    /// Task database file; created with its schema when absent.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DB_FILE)]
    pub db: PathBuf,

    /// Directory for rolling log files [default: ./logs]
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error [default: debug in debug builds, info otherwise]
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Cli {
    /// Resolves relative paths against `cwd` and fills defaults.
    pub fn resolve(self, cwd: &Path) -> AppConfig {
        let log_dir = self
            .log_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        AppConfig {
            db_path: absolutize(cwd, self.db),
            log_dir: absolutize(cwd, log_dir),
            log_level: self
                .log_level
                .unwrap_or_else(|| default_log_level().to_string()),
        }
    }
}

fn absolutize(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, DEFAULT_DB_FILE};
    use clap::Parser;
    use std::path::{Path, PathBuf};
    use todo_core::default_log_level;

    #[test]
    fn defaults_resolve_against_working_directory() {
        let cwd = Path::new("/home/user/work");
        let config = Cli::try_parse_from(["todo"]).unwrap().resolve(cwd);

        assert_eq!(config.db_path, cwd.join(DEFAULT_DB_FILE));
        assert_eq!(config.log_dir, cwd.join("logs"));
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn explicit_flags_override_defaults() {
        let cwd = Path::new("/home/user/work");
        let config = Cli::try_parse_from([
            "todo",
            "--db",
            "/data/tasks.sqlite",
            "--log-dir",
            "var/log",
            "--log-level",
            "warn",
        ])
        .unwrap()
        .resolve(cwd);

        assert_eq!(config.db_path, PathBuf::from("/data/tasks.sqlite"));
        assert_eq!(config.log_dir, cwd.join("var/log"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Cli::try_parse_from(["todo", "--sync"]).is_err());
    }
}
