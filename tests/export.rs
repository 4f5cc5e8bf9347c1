//! Exporting the current result frame to CSV and XLSX.

mod common;

use std::collections::HashMap;

use common::{people_frame, session_with_frame};
use hive_session::HiveError;
use polars::prelude::{CsvReadOptions, SerReader};

#[test]
fn export_csv_round_trips_the_last_read_frame() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _log) = session_with_frame(people_frame());
    session.set_save_directory(dir.path());
    session.set_report_name("people");

    let read = session.read_frame("SELECT * FROM people");
    let path = session.export_data(true).unwrap();
    assert_eq!(path, dir.path().join("people.csv"));

    let back = CsvReadOptions::default()
        .try_into_reader_with_file_path(Some(path))
        .unwrap()
        .finish()
        .unwrap();
    assert_eq!(back.shape(), read.shape());
    assert!(back.equals(&read));
}

#[test]
fn export_xlsx_writes_a_workbook_at_the_xlsx_path() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _log) = session_with_frame(people_frame());
    session.set_save_directory(dir.path());
    session.set_report_name("people");

    let _ = session.read_frame("SELECT * FROM people");
    let path = session.export_data(false).unwrap();
    assert_eq!(path, dir.path().join("people.xlsx"));

    let metadata = std::fs::metadata(&path).unwrap();
    assert!(metadata.len() > 0, "workbook file should not be empty");
}

#[test]
fn export_before_any_read_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _log) = session_with_frame(people_frame());
    session.set_save_directory(dir.path());
    assert!(matches!(session.export_data(true), Err(HiveError::User(_))));
}

#[test]
fn export_uses_the_most_recent_read() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _log) = session_with_frame(people_frame());
    session.set_save_directory(dir.path());
    session.set_report_name("latest");

    // First read, then a rename and a second read; the export reflects the
    // second read under the current paths.
    let _ = session.read_frame("SELECT * FROM people");
    let second = session.read_frame("SELECT * FROM people WHERE id > 0");
    let path = session.export_data(true).unwrap();

    let back = CsvReadOptions::default()
        .try_into_reader_with_file_path(Some(path))
        .unwrap()
        .finish()
        .unwrap();
    assert!(back.equals(&second));
}

#[test]
fn export_does_not_touch_write_paths() {
    // Exporting after a bulk write still uses the last *read* frame.
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _log) = session_with_frame(people_frame());
    session.set_save_directory(dir.path());
    session.set_report_name("stable");

    let read = session.read_frame("SELECT * FROM people");
    session
        .write_frame(&read, "people_copy", &HashMap::new())
        .unwrap();
    let path = session.export_data(true).unwrap();

    let back = CsvReadOptions::default()
        .try_into_reader_with_file_path(Some(path))
        .unwrap()
        .finish()
        .unwrap();
    assert!(back.equals(&read));
}
