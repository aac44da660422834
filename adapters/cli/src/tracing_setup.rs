//! Tracing subscriber initialisation for the `neuropulse` binary.
//!
//! Filter priority, highest first:
//!
//! 1. `NEUROPULSE_LOG` (per-target directives, e.g. `neuropulse_system_reclaim=debug,warn`)
//! 2. `RUST_LOG`
//! 3. CLI flags (`-v` selects debug, `-q` selects error)
//! 4. `warn`

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_ENV: &str = "NEUROPULSE_LOG";

/// Verbosity level derived from CLI flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verbosity {
    /// `--quiet`: only errors.
    Quiet,
    /// Warnings and above.
    Normal,
    /// `--verbose`: debug output.
    Verbose,
}

impl Verbosity {
    /// Derives the verbosity from the parsed flags; `verbose` wins when both are set.
    #[must_use]
    pub(crate) const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub(crate) const fn default_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
        }
    }
}

/// Installs the global subscriber writing compact logs to stderr.
pub(crate) fn init_subscriber(verbosity: Verbosity) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    let registry = tracing_subscriber::registry().with(build_env_filter(verbosity));
    let installed = if verbosity == Verbosity::Verbose {
        registry
            .with(fmt_layer.with_timer(fmt::time::uptime()))
            .try_init()
    } else {
        registry.with(fmt_layer.without_time().compact()).try_init()
    };
    installed.map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    if let Some(filter) = std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return filter;
    }

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    EnvFilter::new(verbosity.default_level().as_str())
}
