pub(crate) mod test_data;

/// Initialize logging for tests
pub(crate) fn init() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
