//! Iterator lifecycle: lazy hydration, skip-on-error, close semantics

mod common;

use chrono::{TimeZone, Utc};
use seisarc::datamodel::{EventParameters, Pick};
use seisarc::prelude::*;

fn populated_archive(picks: usize) -> DatabaseArchive {
    let mut archive = common::setup();
    let mut parameters = EventParameters::with_public_id("it/ep");
    archive.write(&mut parameters, "").unwrap();
    for i in 0..picks {
        let mut pick = Pick::with_public_id(format!("it/pick/{}", i));
        pick.time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::seconds(i as i64);
        archive.write(&mut pick, "it/ep").unwrap();
    }
    archive
}

#[test]
fn test_iterate_children() {
    let mut archive = populated_archive(5);

    let mut iterator = archive
        .get_objects(Parent::PublicId("it/ep"), Pick::class_info(), false)
        .unwrap();

    let mut seen = Vec::new();
    for object in iterator.by_ref() {
        let pick = object.into_any().downcast::<Pick>().unwrap();
        seen.push(pick.public_id.clone());
    }
    assert_eq!(iterator.fetched(), 5);
    seen.sort();
    assert_eq!(seen[0], "it/pick/0");
    assert_eq!(seen.len(), 5);
    assert!(!iterator.valid());
}

#[test]
fn test_iterator_without_public_object_join() {
    let mut archive = populated_archive(2);

    let mut iterator = archive
        .get_objects(Parent::PublicId("it/ep"), Pick::class_info(), true)
        .unwrap();

    let object = iterator.next().expect("row present");
    let pick = object.into_any().downcast::<Pick>().unwrap();
    // without the PublicObject join no publicID column is selected
    assert_eq!(pick.public_id, "");
    assert_ne!(iterator.oid(), INVALID_OID);
    assert_ne!(iterator.parent_oid(), INVALID_OID);
}

#[test]
fn test_unknown_parent_yields_closed_iterator() {
    let mut archive = populated_archive(1);

    let mut iterator = archive
        .get_objects(Parent::PublicId("it/none"), Pick::class_info(), false)
        .unwrap();
    assert!(!iterator.valid());
    assert!(iterator.next().is_none());
    assert_eq!(iterator.fetched(), 0);
}

#[test]
fn test_close_mid_iteration_stops_cleanly() {
    let mut archive = populated_archive(5);

    let mut iterator = archive
        .get_objects(Parent::PublicId("it/ep"), Pick::class_info(), false)
        .unwrap();

    assert!(iterator.next().is_some());
    assert!(iterator.next().is_some());
    assert_eq!(iterator.fetched(), 2);

    archive.close();

    assert!(iterator.next().is_none());
    assert_eq!(iterator.fetched(), 2);

    // the archive refuses further work after close
    let mut parameters = EventParameters::with_public_id("it/late");
    assert!(archive.write(&mut parameters, "").is_err());
}

#[test]
fn test_explicit_close_releases_cursor() {
    let mut archive = populated_archive(3);

    let mut iterator = archive
        .get_objects(Parent::All, Pick::class_info(), false)
        .unwrap();
    assert!(iterator.next().is_some());
    iterator.close();
    assert!(iterator.next().is_none());

    // the cursor is free again for the next query
    let count = archive
        .get_objects(Parent::All, Pick::class_info(), false)
        .unwrap()
        .count();
    assert_eq!(count, 3);
}

#[test]
fn test_undecodable_rows_are_skipped() {
    let mut archive = populated_archive(2);

    // plant a Pick row whose timestamp cannot be parsed
    archive
        .execute("insert into Object(_oid) values(NULL)")
        .unwrap();
    let bad_oid = common::query_count(&archive, "select max(_oid) from Object");
    archive
        .execute(&format!(
            "insert into Pick(_oid, _parent_oid, time, time_ms, waveformID_networkCode, \
             waveformID_stationCode) values({}, 1, 'not-a-time', 0, 'XX', 'YY')",
            bad_oid
        ))
        .unwrap();

    let mut iterator = archive
        .get_objects(Parent::All, Pick::class_info(), true)
        .unwrap();
    let objects: Vec<_> = iterator.by_ref().collect();
    assert_eq!(objects.len(), 2);
    assert_eq!(iterator.fetched(), 2);
}

#[test]
fn test_registered_ids_from_iteration() {
    let mut archive = populated_archive(1);

    let mut iterator = archive
        .get_objects(Parent::PublicId("it/ep"), Pick::class_info(), false)
        .unwrap();
    let object = iterator.next().unwrap();
    let expected = iterator.oid();
    drop(iterator);

    // hydration registers the row id under the object's identity
    assert_eq!(archive.cached_id(object.as_ref()), Some(expected));
}
