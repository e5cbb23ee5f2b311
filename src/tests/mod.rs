pub(crate) mod mocks;

pub use io::load_test_file;

pub const TEST_WEBHOOK_SECRET: &str = "ABCDEF";
