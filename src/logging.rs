use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter directive for the command-line verbosity, falling back to the
/// configured level when no `-v` was given.
pub fn directive(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber, writing to stderr. `RUST_LOG` wins over
/// everything else.
pub fn init(verbose: u8, configured: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(directive(verbose, configured)).unwrap_or_else(|_| EnvFilter::new("info"))
    });
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "warn", "warn")]
    #[case(1, "warn", "debug")]
    #[case(2, "warn", "trace")]
    #[case(5, "info", "trace")]
    fn test_directive(#[case] verbose: u8, #[case] configured: &str, #[case] expected: &str) {
        assert_eq!(directive(verbose, configured), expected);
    }
}
