use std::path::PathBuf;

mod pipeline;

/// Clears and returns the output directory of an integration test.
fn data_output_path(test_name: &str) -> PathBuf {
    let dir = PathBuf::from("data/integration_tests/").join(test_name);
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("Failed to clear test output directory");
    }
    std::fs::create_dir_all(&dir).expect("Failed to create test output directory");
    dir
}
