use poolbench::file_churn::{self, FileChurnComparator};
use poolbench::{BenchError, Comparator, FileChurnConfig, Strategy};

mod test_utils;

use test_utils::{leftover_files, worker_program};

fn config_in(dir: &std::path::Path, file_count: usize, file_size: usize) -> FileChurnConfig {
    FileChurnConfig {
        file_count,
        file_size,
        work_dir: dir.to_path_buf(),
        ..FileChurnConfig::default()
    }
}

#[test]
fn test_every_strategy_reads_back_every_byte() {
    test_utils::init_logger();
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), 6, 32 * 1024);
    let expected = vec![32 * 1024u64; 6];

    assert_eq!(file_churn::run_serial(&config).unwrap(), expected);
    assert_eq!(file_churn::run_threads(&config).unwrap(), expected);
    assert_eq!(file_churn::run_processes(&worker_program(), &config).unwrap(), expected);
    assert!(leftover_files(dir.path(), "test_file_").is_empty());
}

#[test]
fn test_threads_leave_no_files_behind() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), 30, 1024 * 1024);

    let results = file_churn::run_threads(&config).unwrap();

    assert_eq!(results.len(), 30);
    for index in 0..30 {
        let path = config.file_path(index);
        assert!(!path.exists(), "{path:?} still exists");
    }
}

#[test]
fn test_missing_work_dir_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir.path().join("gone"), 3, 16);

    assert!(matches!(file_churn::run_serial(&config), Err(BenchError::File { .. })));
    assert!(matches!(file_churn::run_threads(&config), Err(BenchError::File { .. })));
}

#[test]
fn test_comparator_strategies() {
    let dir = tempfile::tempdir().unwrap();
    let comparator = FileChurnComparator::new(config_in(dir.path(), 3, 128), worker_program());

    assert_eq!(
        comparator.strategies(),
        vec![Strategy::Serial, Strategy::Threads, Strategy::Processes { chunksize: 1 }]
    );
    for strategy in comparator.strategies() {
        assert_eq!(comparator.run(strategy).unwrap(), 3);
    }
    assert!(matches!(
        comparator.run(Strategy::Cooperative),
        Err(BenchError::UnsupportedStrategy { .. })
    ));
    assert!(leftover_files(dir.path(), "test_file_").is_empty());
}
