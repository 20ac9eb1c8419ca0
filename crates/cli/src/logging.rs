use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Output goes to stderr so the stdio
/// transport owns stdout.
pub fn setup_logging(verbose_level: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let filter_str = match verbose_level {
            0 => "warn,mwb_mcp=info,mcp=info,runtime=info,workbench=info",
            1 => "info,mwb_mcp=debug,mcp=debug,runtime=debug,workbench=debug",
            _ => "debug,mwb_mcp=trace,mcp=trace,runtime=trace,workbench=trace",
        };
        EnvFilter::new(filter_str)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}
