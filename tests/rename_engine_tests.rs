// Integration tests for the rename engine module

use std::fs;
use std::path::{Path, PathBuf};

use file_counter::events::{EventLog, RenameEvent};
use file_counter::rename_engine::{ConfigBuilder, FileManager};

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, name).unwrap();
    path
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_renumbers_in_place_and_strips_existing_numbers() {
    let temp = tempfile::tempdir().unwrap();
    let b = touch(temp.path(), "b.txt");
    let a = touch(temp.path(), "2. a.txt");
    let c = touch(temp.path(), "c.txt");

    let mut manager = FileManager::without_observers();
    assert_eq!(manager.add_files([&b, &a, &c]), 3);

    let report = manager.execute_renumbering(5, None);

    assert!(report.success);
    assert_eq!(report.processed, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(manager.count(), 0);
    assert_eq!(names_in(temp.path()), vec!["5. b.txt", "6. a.txt", "7. c.txt"]);
    assert_eq!(fs::read_to_string(temp.path().join("6. a.txt")).unwrap(), "2. a.txt");
}

#[test]
fn test_vanished_file_is_skipped_without_using_a_number() {
    let temp = tempfile::tempdir().unwrap();
    let b = touch(temp.path(), "b.txt");
    let a = touch(temp.path(), "2. a.txt");
    let c = touch(temp.path(), "c.txt");

    let mut manager = FileManager::without_observers();
    manager.add_files([&b, &a, &c]);
    fs::remove_file(&c).unwrap();

    let report = manager.execute_renumbering(5, None);

    assert!(report.success);
    assert_eq!(report.processed, 2);
    assert_eq!(report.skipped, vec![c]);
    assert_eq!(names_in(temp.path()), vec!["5. b.txt", "6. a.txt"]);
}

#[test]
fn test_all_sources_vanished_is_a_noop_success() {
    let temp = tempfile::tempdir().unwrap();
    let a = touch(temp.path(), "a.txt");

    let mut manager = FileManager::without_observers();
    manager.add_files([&a]);
    fs::remove_file(&a).unwrap();

    let report = manager.execute_renumbering(1, None);
    assert!(report.success);
    assert!(report.is_noop());
    assert_eq!(manager.count(), 1);
}

#[test]
fn test_copies_into_new_output_directory() {
    let temp = tempfile::tempdir().unwrap();
    let src = temp.path().join("src");
    fs::create_dir(&src).unwrap();
    let x = touch(&src, "01_intro.md");
    let y = touch(&src, "outro.md");
    let out = temp.path().join("nested").join("out");

    let config = ConfigBuilder::new()
        .start_number(1)
        .output_dir(Some(&out))
        .build()
        .unwrap();

    let mut manager = FileManager::without_observers();
    manager.add_files([&x, &y]);
    let report = manager.execute(&config);

    assert!(report.success);
    assert_eq!(report.processed, 2);
    assert_eq!(names_in(&out), vec!["1. intro.md", "2. outro.md"]);
    // Originals stay where they were.
    assert_eq!(names_in(&src), vec!["01_intro.md", "outro.md"]);
    assert_eq!(report.renamed[0].to, out.join("1. intro.md"));
}

#[test]
fn test_never_overwrites_existing_targets() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("out");
    fs::create_dir(&out).unwrap();
    touch(&out, "1. report.txt");
    touch(&out, "1. report_1.txt");
    let report_src = touch(temp.path(), "report.txt");

    let mut manager = FileManager::without_observers();
    manager.add_files([&report_src]);
    let report = manager.execute_renumbering(1, Some(&out));

    assert!(report.success);
    assert_eq!(report.renamed[0].to, out.join("1. report_2.txt"));
    assert_eq!(fs::read_to_string(out.join("1. report.txt")).unwrap(), "1. report.txt");
}

#[test]
fn test_file_already_carrying_its_number_gets_a_suffix() {
    let temp = tempfile::tempdir().unwrap();
    let a = touch(temp.path(), "3. a.txt");

    let mut manager = FileManager::without_observers();
    manager.add_files([&a]);
    let report = manager.execute_renumbering(3, None);

    assert!(report.success);
    assert_eq!(report.processed, 1);
    assert_eq!(report.renamed[0].to, temp.path().join("3. a_1.txt"));
    assert_eq!(names_in(temp.path()), vec!["3. a_1.txt"]);
}

#[test]
fn test_last_representable_number_is_used() {
    let temp = tempfile::tempdir().unwrap();
    let a = touch(temp.path(), "a.txt");

    let mut manager = FileManager::without_observers();
    manager.add_files([&a]);
    let report = manager.execute_renumbering(i64::MAX, None);

    assert!(report.success);
    assert_eq!(report.processed, 1);
    assert_eq!(names_in(temp.path()), vec![format!("{}. a.txt", i64::MAX)]);
    assert!(manager.is_empty());
}

#[test]
fn test_running_out_of_numbers_stops_the_pass() {
    let temp = tempfile::tempdir().unwrap();
    let a = touch(temp.path(), "a.txt");
    let b = touch(temp.path(), "b.txt");

    let mut manager = FileManager::without_observers();
    manager.add_files([&a, &b]);
    let report = manager.execute_renumbering(i64::MAX, None);

    assert!(!report.success);
    assert_eq!(report.processed, 1);
    assert!(report.is_partial());
    assert!(report.error.as_deref().unwrap().contains("b.txt"));
    assert_eq!(
        names_in(temp.path()),
        vec![format!("{}. a.txt", i64::MAX), "b.txt".to_string()]
    );
    assert_eq!(manager.count(), 2);
}

#[test]
fn test_vanished_file_after_last_number_does_not_fail() {
    let temp = tempfile::tempdir().unwrap();
    let a = touch(temp.path(), "a.txt");
    let b = touch(temp.path(), "b.txt");

    let mut manager = FileManager::without_observers();
    manager.add_files([&a, &b]);
    fs::remove_file(&b).unwrap();
    let report = manager.execute_renumbering(i64::MAX, None);

    assert!(report.success);
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, vec![b]);
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_at_target_is_not_replaced() {
    let temp = tempfile::tempdir().unwrap();
    let a = touch(temp.path(), "a.txt");
    let link = temp.path().join("1. a.txt");
    std::os::unix::fs::symlink(temp.path().join("gone.txt"), &link).unwrap();

    let mut manager = FileManager::without_observers();
    manager.add_files([&a]);
    let report = manager.execute_renumbering(1, None);

    assert!(report.success);
    assert_eq!(report.renamed[0].to, temp.path().join("1. a_1.txt"));
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
}

#[test]
fn test_output_path_that_is_a_file_fails_the_pass() {
    let temp = tempfile::tempdir().unwrap();
    let a = touch(temp.path(), "a.txt");
    let blocker = touch(temp.path(), "not-a-dir");

    let mut manager = FileManager::without_observers();
    manager.add_files([&a]);
    let report = manager.execute_renumbering(1, Some(&blocker));

    assert!(!report.success);
    assert_eq!(report.processed, 0);
    assert!(report.error.is_some());
    assert_eq!(manager.count(), 1);
}

#[cfg(unix)]
#[test]
fn test_error_midway_keeps_completed_renames() {
    let temp = tempfile::tempdir().unwrap();
    let short = touch(temp.path(), "a.txt");
    // "9. " + 252 bytes fits in 255, "10. " + 252 does not.
    let long_name = format!("{}.txt", "l".repeat(248));
    let long = touch(temp.path(), &long_name);
    let last = touch(temp.path(), "z.txt");

    let mut manager = FileManager::without_observers();
    manager.add_files([&short, &long, &last]);
    let report = manager.execute_renumbering(9, None);

    assert!(!report.success);
    assert!(report.is_partial());
    assert_eq!(report.processed, 1);
    assert!(temp.path().join("9. a.txt").exists());
    assert!(long.exists());
    assert!(last.exists());
    assert_eq!(manager.count(), 3);
}

#[test]
fn test_observer_sees_pass_events() {
    let temp = tempfile::tempdir().unwrap();
    let a = touch(temp.path(), "7) a.txt");

    let log = EventLog::new(50);
    let mut manager = FileManager::without_observers();
    manager.subscribe(Box::new(log.clone()));
    manager.add_files([&a, &temp.path().join("ghost.txt")]);
    manager.execute_renumbering(1, None);

    let events = log.snapshot();
    assert!(events.contains(&RenameEvent::FilesAdded { requested: 2, added: 1 }));
    assert!(events.iter().any(|e| matches!(
        e,
        RenameEvent::NumberingStripped { stripped, .. } if stripped == "a.txt"
    )));
    assert!(events.iter().any(|e| matches!(e, RenameEvent::FileRenamed { number: 1, .. })));
    assert!(events.contains(&RenameEvent::PassCompleted { processed: 1, skipped: 0 }));
    assert_eq!(events.last(), Some(&RenameEvent::ListCleared { count: 1 }));
}
