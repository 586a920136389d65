mod test_volume;

/// Seed shared by the randomised tests.
pub const SEED: u64 = 42;

/// Routes `log` output through the test harness; safe to call repeatedly.
pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
