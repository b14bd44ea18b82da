use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter directives used when `RUST_LOG` is not set.
///
/// One `-v` shows debug output for this crate, more also shows the HTTP client.
fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "cbrfx=off",
        1 => "cbrfx=debug",
        _ => "cbrfx=trace,reqwest=debug",
    }
}

/// Installs a compact stderr logger, stdout is reserved for rate output.
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .without_time()
                .with_target(verbosity > 1)
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_by_verbosity() {
        assert_eq!(default_directives(0), "cbrfx=off");
        assert_eq!(default_directives(1), "cbrfx=debug");
        assert_eq!(default_directives(2), "cbrfx=trace,reqwest=debug");
        assert_eq!(default_directives(5), default_directives(2));
    }

    #[test]
    fn test_default_directives_parse() {
        for verbosity in 0..3 {
            assert!(EnvFilter::try_new(default_directives(verbosity)).is_ok());
        }
    }
}
