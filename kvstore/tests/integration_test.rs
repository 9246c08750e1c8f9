use kvstore::{KVDb, KVStoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct Sensor {
    id: String,
    family: u8,
    aliases: Vec<String>,
}

#[test]
fn write_and_read_object_across_connections() -> Result<(), KVStoreError> {
    let _ = env_logger::builder().is_test(true).try_init();
    let tempdir = tempfile::tempdir()?;
    let sqlite_db = tempdir.path().join("kvs-db/kvstore.db");

    let db = KVDb::new(&sqlite_db)?;

    let probe = Sensor {
        id: String::from("28.0000051c7a3b"),
        family: 0x28,
        aliases: vec![String::from("boiler"), String::from("flow")],
    };

    db.set("probe", &probe)?;
    let probe2: Sensor = db.get("probe")?.unwrap();
    assert_eq!(probe2, probe);

    let db2 = KVDb::new(&sqlite_db)?;
    let probe3: Sensor = db2.get("probe")?.unwrap();
    assert_eq!(probe3, probe);
    assert_eq!(db2.keys_with_prefix("pro")?, vec!["probe"]);

    Ok(())
}

#[test]
fn reading_wrong_type_is_json_error() -> Result<(), KVStoreError> {
    let db = KVDb::new(":memory:")?;
    db.set("count", 3)?;
    assert!(matches!(
        db.get::<Sensor>("count"),
        Err(KVStoreError::Json(_))
    ));
    Ok(())
}
