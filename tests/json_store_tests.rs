use chrono::{NaiveDate, NaiveTime};
use school_calendar::{
    CalendarEntry, CalendarStore, ClassSession, DayOfWeek, DaySchedule, GroupDirectory, Holiday,
    JsonCalendarStore, PersistenceError, StudentGroup, VacationPeriod, export_entries_to_csv,
    import_entries_from_csv,
};
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn sample_entries() -> Vec<CalendarEntry> {
    let mut holiday = Holiday::new("Armistice", date(2024, 11, 11)).with_id("h1");
    holiday.description = Some("Remembrance, with a comma".into());
    vec![
        CalendarEntry::Holiday(holiday),
        CalendarEntry::Vacation(
            VacationPeriod::new("Noël", date(2024, 12, 21), date(2025, 1, 6)).with_id("v1"),
        ),
    ]
}

#[test]
fn missing_files_read_as_empty() {
    let dir = tempdir().expect("temp dir");
    let store = JsonCalendarStore::new(dir.path().join("data")).expect("store");
    assert!(store.get_regular_schedule().unwrap().is_empty());
    assert!(store.get_holidays().unwrap().is_empty());
    assert!(store.get_all_student_groups().unwrap().is_empty());
}

#[test]
fn schedule_and_entries_survive_reopen() {
    let dir = tempdir().expect("temp dir");
    let mut wednesday = DaySchedule::new(DayOfWeek::Wednesday);
    wednesday.classes.push(
        ClassSession::new(
            DayOfWeek::Wednesday,
            "Maths",
            "6A",
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        )
        .with_id("c1"),
    );

    {
        let store = JsonCalendarStore::new(dir.path()).unwrap();
        store.save_regular_schedule(&[wednesday.clone()]).unwrap();
        store.save_holidays(&sample_entries()).unwrap();
        store
            .save_student_groups(&[StudentGroup::new("6A"), StudentGroup::new("5B")])
            .unwrap();
    }

    let reopened = JsonCalendarStore::new(dir.path()).unwrap();
    assert_eq!(reopened.get_regular_schedule().unwrap(), vec![wednesday]);
    assert_eq!(reopened.get_holidays().unwrap(), sample_entries());
    let groups = reopened.get_all_student_groups().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[1].group, "5B");
    assert!(!dir.path().join("holidays.json.tmp").exists());
}

#[test]
fn stored_days_use_french_names_and_hhmm_times() {
    let dir = tempdir().expect("temp dir");
    let store = JsonCalendarStore::new(dir.path()).unwrap();
    let mut monday = DaySchedule::new(DayOfWeek::Monday);
    monday.classes.push(ClassSession::new(
        DayOfWeek::Monday,
        "Art",
        "4C",
        NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
    ));
    store.save_regular_schedule(&[monday]).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("schedule.json")).unwrap();
    assert!(raw.contains("\"lundi\""));
    assert!(raw.contains("\"startTime\": \"14:00\""));
}

#[test]
fn legacy_untagged_records_are_partitioned_by_shape() {
    let dir = tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("holidays.json"),
        r#"[
            {"id": "h1", "name": "Pâques", "date": "2024-04-01", "type": "bankHoliday"},
            {"id": "v1", "name": "Été", "startDate": "2024-07-06", "endDate": "2024-09-01", "type": "vacation"}
        ]"#,
    )
    .unwrap();
    let store = JsonCalendarStore::new(dir.path()).unwrap();
    let entries = store.get_holidays().unwrap();
    assert!(matches!(&entries[0], CalendarEntry::Holiday(h) if h.id == "h1"));
    assert!(matches!(&entries[1], CalendarEntry::Vacation(v) if v.duration_days() == 58));
}

#[test]
fn unrecognized_record_is_an_error() {
    let dir = tempdir().expect("temp dir");
    std::fs::write(dir.path().join("holidays.json"), r#"[{"name": "Nothing"}]"#).unwrap();
    let store = JsonCalendarStore::new(dir.path()).unwrap();
    let err = store.get_holidays().unwrap_err();
    assert!(matches!(err, PersistenceError::EntryShape(_)));
}

#[test]
fn csv_export_and_import_preserve_entries() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("entries.csv");
    export_entries_to_csv(&sample_entries(), &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.lines().next().unwrap().starts_with("kind,id,name"));

    let imported = import_entries_from_csv(&path).unwrap();
    assert_eq!(imported, sample_entries());
}

#[test]
fn csv_import_reports_bad_dates() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("bad.csv");
    std::fs::write(
        &path,
        "kind,id,name,date,start_date,end_date,type,description\nholiday,h1,Broken,2024-13-40,,,bankHoliday,\n",
    )
    .unwrap();
    assert!(import_entries_from_csv(&path).is_err());
}

#[test]
fn legacy_holiday_keeps_its_id_across_reloads() {
    let dir = tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("holidays.json"),
        r#"[{"name": "Noel", "date": "2024-12-25"}]"#,
    )
    .unwrap();
    let store = std::sync::Arc::new(JsonCalendarStore::new(dir.path()).unwrap());

    let mut manager = school_calendar::CalendarManager::with_shared_store(store.clone());
    manager.load().unwrap();
    let first_id = manager.holidays()[0].id.clone();
    assert!(!first_id.is_empty());

    let mut reopened = school_calendar::CalendarManager::with_shared_store(store);
    reopened.load().unwrap();
    assert_eq!(reopened.holidays()[0].id, first_id);
    assert!(
        reopened
            .add_or_edit(school_calendar::EntityKind::Holiday, Some(first_id.as_str()))
            .is_ok()
    );
}
