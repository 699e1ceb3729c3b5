use std::process::Command;

use access_age::{Config, run};

#[test]
fn generated_logs_feed_the_analyzer() {
    let root = tempfile::TempDir::new().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_noise-maker"))
        .args(["--log-root", root.path().to_str().unwrap()])
        .args(["--hosts", "2", "--files", "2", "--lines", "500"])
        .args(["--day", "01/Jan/2020", "--seed", "11"])
        .status()
        .expect("Failed to start noise-maker");
    assert!(status.success());

    let config = Config {
        log_root: root.path().to_path_buf(),
        ..Config::default()
    };
    let summaries = run(&config, &[]).unwrap();
    assert_eq!(summaries.len(), 2);
    for summary in summaries {
        assert_eq!(summary.sources_read, 2);
        assert!(summary.total() > 0);
        assert!(summary.total() < 1000);
        assert_eq!(summary.by_day.len(), 1);
        // since reaches back up to 120 days, so some requests overflow
        assert!(summary.by_bucket[18] > 0);
    }
}
