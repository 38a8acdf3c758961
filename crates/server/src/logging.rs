//! Tracing setup for the service binary.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Verbosity chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Info and above.
    #[default]
    Normal,
    /// Debug and above.
    Verbose,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// Maps `-q` and repeated `-v` flags to a verbosity.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// The matching tracing level.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    fn directives(self) -> String {
        let level = self.level();
        format!("schoolhouse_server={level},salvo={level},sqlx=warn")
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `verbosity`.
///
/// Calling it twice keeps the first subscriber.
pub fn init_logging(verbosity: Verbosity) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 2), Verbosity::Trace);
    }

    #[test]
    fn test_directives_follow_level() {
        assert_eq!(
            Verbosity::Verbose.directives(),
            "schoolhouse_server=DEBUG,salvo=DEBUG,sqlx=warn"
        );
    }
}
