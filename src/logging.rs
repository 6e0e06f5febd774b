/// Console logging with an env-filter on top of an INFO default, so
/// `RUST_LOG` can raise or lower verbosity per module.
pub fn init_console_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}
