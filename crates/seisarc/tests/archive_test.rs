//! End-to-end archive read/write behaviour against in-memory SQLite

mod common;

use chrono::{Duration, TimeZone, Utc};
use seisarc::datamodel::{
    Comment, CreationInfo, Event, EventParameters, Origin, Pick, RealQuantity, TimeQuantity,
    WaveformStreamId,
};
use seisarc::prelude::*;
use seisarc::SeisarcError;

#[test]
fn test_write_and_get_object_roundtrip() {
    let mut archive = common::setup();

    let mut parameters = EventParameters::with_public_id("evt/2024/x1");
    archive.write(&mut parameters, "").unwrap();

    let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap() + Duration::microseconds(123_456);
    let mut pick = Pick::with_public_id("pick/2024/x1");
    pick.time = time;
    pick.waveform_id = WaveformStreamId::new("GE", "APE", "", "BHZ");
    pick.method_id = Some("aic".to_string());
    pick.creation_info = Some(CreationInfo {
        agency_id: Some("GFZ".to_string()),
        author: None,
        creation_time: Some(time + Duration::seconds(30)),
    });
    archive.write(&mut pick, "evt/2024/x1").unwrap();

    // split timestamp lands as a seconds/microseconds column pair
    assert_eq!(
        common::query_one(&archive, "select time from Pick").as_deref(),
        Some("2024-01-02 03:04:05")
    );
    assert_eq!(
        common::query_one(&archive, "select time_ms from Pick").as_deref(),
        Some("123456")
    );

    // the child row references its parent's oid
    let parent_oid = archive.cached_id(&parameters).unwrap();
    assert_eq!(
        common::query_count(&archive, "select _parent_oid from Pick"),
        parent_oid as i64
    );

    let stored = archive
        .get_object::<Pick>("pick/2024/x1")
        .unwrap()
        .expect("pick present");
    assert_eq!(stored.public_id, "pick/2024/x1");
    assert_eq!(stored.time, time);
    assert_eq!(stored.waveform_id, pick.waveform_id);
    assert_eq!(stored.filter_id, None);
    assert_eq!(stored.method_id, Some("aic".to_string()));
    assert_eq!(stored.creation_info, pick.creation_info);

    // unknown ids are not an error
    assert!(archive.get_object::<Pick>("pick/none").unwrap().is_none());
}

#[test]
fn test_duplicate_public_id_is_refused() {
    let mut archive = common::setup();

    let mut first = EventParameters::with_public_id("dup/1");
    archive.write(&mut first, "").unwrap();

    let mut second = EventParameters::with_public_id("dup/1");
    let err = archive.write(&mut second, "").unwrap_err();
    assert!(matches!(err, SeisarcError::DuplicatePublicId(_)));

    assert_eq!(
        common::query_count(
            &archive,
            "select count(*) from PublicObject where publicID='dup/1'"
        ),
        1
    );
    // no provisional Object row remains
    assert_eq!(common::query_count(&archive, "select count(*) from Object"), 1);
}

#[test]
fn test_write_with_unknown_parent_leaves_no_row() {
    let mut archive = common::setup();

    let mut pick = Pick::with_public_id("pick/orphan");
    pick.time = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let err = archive.write(&mut pick, "no/such/parent").unwrap_err();
    assert!(matches!(err, SeisarcError::ParentNotFound(_)));

    assert_eq!(common::query_count(&archive, "select count(*) from Object"), 0);
    assert_eq!(common::query_count(&archive, "select count(*) from Pick"), 0);
    assert_eq!(
        common::query_count(&archive, "select count(*) from PublicObject"),
        0
    );
}

#[test]
fn test_non_root_class_requires_parent() {
    let mut archive = common::setup();

    let mut pick = Pick::with_public_id("pick/no-parent");
    pick.time = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    assert!(archive.write(&mut pick, "").is_err());
    assert_eq!(common::query_count(&archive, "select count(*) from Object"), 0);
}

#[test]
fn test_update_is_idempotent() {
    let mut archive = common::setup();

    let mut parameters = EventParameters::with_public_id("ep/u");
    archive.write(&mut parameters, "").unwrap();

    let mut pick = Pick::with_public_id("pick/u");
    pick.time = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
    pick.waveform_id = WaveformStreamId::new("GE", "APE", "", "BHZ");
    archive.write(&mut pick, "ep/u").unwrap();

    pick.filter_id = Some("BW(3,0.7,2)".to_string());
    archive.update(&mut pick, "ep/u").unwrap();
    archive.update(&mut pick, "ep/u").unwrap();

    assert_eq!(common::query_count(&archive, "select count(*) from Pick"), 1);
    let stored = archive.get_object::<Pick>("pick/u").unwrap().unwrap();
    assert_eq!(stored.filter_id, Some("BW(3,0.7,2)".to_string()));
    assert_eq!(stored.time, pick.time);
}

#[test]
fn test_update_requires_persisted_object() {
    let mut archive = common::setup();

    let mut parameters = EventParameters::with_public_id("ep/u2");
    archive.write(&mut parameters, "").unwrap();

    let mut pick = Pick::with_public_id("pick/never-written");
    pick.time = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
    let err = archive.update(&mut pick, "ep/u2").unwrap_err();
    assert!(matches!(err, SeisarcError::ObjectNotFound(_)));
}

#[test]
fn test_nullable_nested_struct_flag() {
    let mut archive = common::setup();

    let mut parameters = EventParameters::with_public_id("ep/n");
    archive.write(&mut parameters, "").unwrap();

    let mut absent = Origin::with_public_id("origin/absent");
    absent.time = TimeQuantity::new(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
    absent.latitude = RealQuantity::new(52.38);
    absent.longitude = RealQuantity::new(13.07);
    archive.write(&mut absent, "ep/n").unwrap();

    assert_eq!(
        common::query_one(
            &archive,
            "select depth_used from Origin where _oid=(select _oid from PublicObject \
             where publicID='origin/absent')"
        )
        .as_deref(),
        Some("0")
    );
    assert_eq!(
        common::query_one(
            &archive,
            "select depth_value from Origin where depth_used='0'"
        ),
        None
    );

    let mut present = Origin::with_public_id("origin/present");
    present.time = TimeQuantity::new(Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap());
    present.latitude = RealQuantity::new(52.38);
    present.longitude = RealQuantity::new(13.07);
    present.depth = Some(RealQuantity {
        value: 10.5,
        uncertainty: Some(0.25),
    });
    archive.write(&mut present, "ep/n").unwrap();

    let stored = archive.get_object::<Origin>("origin/absent").unwrap().unwrap();
    assert_eq!(stored.depth, None);

    let stored = archive.get_object::<Origin>("origin/present").unwrap().unwrap();
    assert_eq!(
        stored.depth,
        Some(RealQuantity {
            value: 10.5,
            uncertainty: Some(0.25),
        })
    );
    assert_eq!(stored.time, present.time);
}

#[test]
fn test_nested_struct_prefix_composition() {
    let mut archive = common::setup();

    let mut parameters = EventParameters::with_public_id("ep/p");
    archive.write(&mut parameters, "").unwrap();

    let time = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 1).unwrap() + Duration::microseconds(250_000);
    let mut origin = Origin::with_public_id("origin/prefix");
    origin.time = TimeQuantity {
        value: time,
        uncertainty: Some(0.12),
    };
    origin.latitude = RealQuantity::new(-21.1);
    origin.longitude = RealQuantity::new(55.7);
    archive.write(&mut origin, "ep/p").unwrap();

    // nested attribute paths flatten with '_' separators
    assert_eq!(
        common::query_one(&archive, "select time_value from Origin").as_deref(),
        Some("2024-05-02 00:00:01")
    );
    assert_eq!(
        common::query_one(&archive, "select time_value_ms from Origin").as_deref(),
        Some("250000")
    );
    assert_eq!(
        common::query_one(&archive, "select time_uncertainty from Origin").as_deref(),
        Some("0.12")
    );
}

#[test]
fn test_content_identified_child_update_and_remove() {
    let mut archive = common::setup();

    let mut parameters = EventParameters::with_public_id("ep/c");
    archive.write(&mut parameters, "").unwrap();

    let mut event = Event::with_public_id("event/c");
    event.event_type = Some("earthquake".to_string());
    archive.write(&mut event, "ep/c").unwrap();

    let mut comment = Comment::new("operator", "first take");
    comment.core_mut().set_parent(ParentLink::to(&event));
    archive.write(&mut comment, "").unwrap();

    comment.text = "revised".to_string();
    archive.update(&mut comment, "").unwrap();
    assert_eq!(
        common::query_one(&archive, "select text from Comment where id='operator'").as_deref(),
        Some("revised")
    );

    // a fresh object with the same content resolves to the same row
    let mut same_content = Comment::new("operator", "does not matter");
    same_content.core_mut().set_parent(ParentLink::to(&event));
    let oid = archive.object_id(&mut same_content, "").unwrap();
    assert_ne!(oid, INVALID_OID);
    assert_eq!(Some(oid), archive.cached_id(&comment));

    archive.remove(&mut comment, "").unwrap();
    assert_eq!(
        common::query_count(&archive, "select count(*) from Comment"),
        0
    );
    // removing an absent object is not an error
    archive.remove(&mut same_content, "").unwrap();
}

#[test]
fn test_identity_cache_consistency() {
    let mut archive = common::setup();

    let mut parameters = EventParameters::with_public_id("ep/cache");
    archive.write(&mut parameters, "").unwrap();

    let oid = archive.cached_id(&parameters).expect("cached after write");
    assert_eq!(
        common::query_count(&archive, "select _oid from EventParameters"),
        oid as i64
    );

    let identity = parameters.core().identity_id();
    drop(parameters);
    assert_eq!(archive.identity_cache().cached_id(identity), None);
}

#[test]
fn test_parent_public_id() {
    let mut archive = common::setup();

    let mut parameters = EventParameters::with_public_id("ep/parent");
    archive.write(&mut parameters, "").unwrap();

    let mut event = Event::with_public_id("event/child");
    archive.write(&mut event, "ep/parent").unwrap();

    assert_eq!(
        archive.parent_public_id(&event).unwrap().as_deref(),
        Some("ep/parent")
    );

    let mut root = EventParameters::with_public_id("ep/root");
    archive.write(&mut root, "").unwrap();
    assert_eq!(archive.parent_public_id(&root).unwrap(), None);
}

#[test]
fn test_object_count() {
    let mut archive = common::setup();

    let mut parameters = EventParameters::with_public_id("ep/count");
    archive.write(&mut parameters, "").unwrap();

    for i in 0..4 {
        let mut pick = Pick::with_public_id(format!("pick/count/{}", i));
        pick.time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, i).unwrap();
        archive.write(&mut pick, "ep/count").unwrap();
    }

    assert_eq!(
        archive
            .object_count(Parent::PublicId("ep/count"), seisarc::datamodel::Pick::class_info())
            .unwrap(),
        4
    );
    assert_eq!(
        archive
            .object_count(Parent::All, seisarc::datamodel::Pick::class_info())
            .unwrap(),
        4
    );
    assert_eq!(
        archive
            .object_count(
                Parent::PublicId("ep/unknown"),
                seisarc::datamodel::Pick::class_info()
            )
            .unwrap(),
        0
    );
}

#[test]
fn test_string_escaping_roundtrip() {
    let mut archive = common::setup();

    let mut parameters = EventParameters::with_public_id("ep/quote");
    archive.write(&mut parameters, "").unwrap();

    let mut event = Event::with_public_id("event/quote");
    event.event_type = Some("operator's pick".to_string());
    archive.write(&mut event, "ep/quote").unwrap();

    let stored = archive.get_object::<Event>("event/quote").unwrap().unwrap();
    assert_eq!(stored.event_type, Some("operator's pick".to_string()));
}
