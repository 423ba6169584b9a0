use log::LevelFilter;

/// `RUST_LOG` overrides the build-dependent default level.
pub fn init_logging() {
    env_logger::builder()
        .filter_level(
            if cfg!(debug_assertions) {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            }
        )
        .parse_default_env()
        .init()
}

// can be called from every test, only the first call installs the logger
pub fn init_test_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .try_init();
}
