//! Schema version gate at archive construction and open time

mod common;

use seisarc::datamodel::{self, EventParameters};
use seisarc::prelude::*;
use seisarc_sqlite::{SqliteConfig, SqliteDriver};

fn driver_with_version(version: Option<&str>) -> SqliteDriver {
    let mut driver = SqliteDriver::new(SqliteConfig::default());
    driver.connect(":memory:").unwrap();
    driver
        .execute(seisarc_sqlite::schema::FRAMEWORK_DDL)
        .unwrap();
    driver.execute(common::DATAMODEL_DDL).unwrap();
    if let Some(version) = version {
        driver
            .execute(&format!(
                "insert into Meta(name, value) values('Schema-Version', '{}')",
                version
            ))
            .unwrap();
    }
    driver
}

#[test]
fn test_supported_version_is_accepted() {
    datamodel::register_all();
    let archive = DatabaseArchive::new(Box::new(driver_with_version(Some("0.12.0")))).unwrap();
    assert_eq!(archive.version().to_string(), "0.12.0");
}

#[test]
fn test_patch_tag_is_ignored() {
    let archive = DatabaseArchive::new(Box::new(driver_with_version(Some("0.12.7")))).unwrap();
    assert_eq!(archive.version().minor, 12);
}

#[test]
fn test_newer_version_is_refused() {
    let err = DatabaseArchive::new(Box::new(driver_with_version(Some("99.0.0")))).unwrap_err();
    assert!(matches!(err, SeisarcError::Schema(_)));
    assert!(err.to_string().contains("not supported"));
}

#[test]
fn test_newer_minor_is_refused() {
    let err = DatabaseArchive::new(Box::new(driver_with_version(Some("0.13")))).unwrap_err();
    assert!(err.to_string().contains("not supported"));
}

#[test]
fn test_invalid_version_is_refused() {
    let err = DatabaseArchive::new(Box::new(driver_with_version(Some("quake")))).unwrap_err();
    assert!(matches!(err, SeisarcError::Schema(_)));
}

#[test]
fn test_missing_version_row_is_refused() {
    // Meta table present but no Schema-Version row
    let err = DatabaseArchive::new(Box::new(driver_with_version(None))).unwrap_err();
    assert!(err.to_string().contains("empty result set"));
}

#[test]
fn test_missing_meta_table_assumes_v0() {
    let mut driver = SqliteDriver::new(SqliteConfig::default());
    driver.connect(":memory:").unwrap();
    let archive = DatabaseArchive::new(Box::new(driver)).unwrap();
    assert_eq!(archive.version().to_string(), "0.0.0");
}

#[test]
fn test_open_connects_and_gates() {
    datamodel::register_all();

    let driver = SqliteDriver::new(SqliteConfig::default());
    let mut archive = DatabaseArchive::new(Box::new(driver)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.sqlite");
    archive.open(path.to_str().unwrap()).unwrap();

    // a fresh file has no Meta table yet: v0.0 is assumed
    assert_eq!(archive.version().to_string(), "0.0.0");

    archive
        .execute(seisarc_sqlite::schema::FRAMEWORK_DDL)
        .unwrap();
    archive.execute(common::DATAMODEL_DDL).unwrap();
    archive
        .execute("insert into Meta(name, value) values('Schema-Version', '0.12.0')")
        .unwrap();

    let mut parameters = EventParameters::with_public_id("open/ep");
    archive.write(&mut parameters, "").unwrap();

    // opening twice is refused
    assert!(archive.open(path.to_str().unwrap()).is_err());

    archive.close();
    assert!(archive.execute("select 1").is_err());
}
