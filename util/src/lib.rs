use std::path::{Path, PathBuf};

#[macro_export]
macro_rules! assert_panics {
    ($e:expr) => {{
        use std::panic::catch_unwind;
        use std::stringify;
        let expr_string = stringify!($e);
        let result = catch_unwind(|| $e);
        if result.is_ok() {
            panic!("assert_panics!({}) failed.", expr_string);
        }
    }};
}

/// Returns the directory in which a unit test should place its output files.
///
/// The directory is emptied so that stale output from a previous run cannot affect the test.
pub fn unit_test_output_dir(test_name: &str) -> PathBuf {
    let dir = Path::new("data/unit_tests/").join(test_name);
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("Failed to clear test output directory");
    }
    std::fs::create_dir_all(&dir).expect("Failed to create test output directory");
    dir
}
