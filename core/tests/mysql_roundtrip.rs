//! round-trip checks against a live mysql server.
//!
//! set `PKBENCH_TEST_DATABASE_URL` (for example
//! `mysql://root@127.0.0.1:3306/pkbench_test`) to run these; they skip
//! themselves otherwise so the default `cargo test` stays network-free.
//! rows are keyed by freshly generated uuids/ids, so the tests tolerate a
//! shared scratch database and parallel execution.

use mysql_async::{Opts, Pool};
use pkbench_core::dal::{Crc32Dal, SnowflakeDal, UuidDal};
use pkbench_core::db;
use pkbench_core::models::{Crc32Record, SnowflakeRecord, UuidRecord, uuid_checksum};
use pkbench_core::service::{BenchSuite, UuidBench, Workload, WorkloadOptions};
use uuid::Uuid;

const URL_VAR: &str = "PKBENCH_TEST_DATABASE_URL";

fn test_pool() -> Option<Pool> {
    let url = match std::env::var(URL_VAR) {
        Ok(url) => url,
        Err(_) => {
            eprintln!("{URL_VAR} not set, skipping live mysql test");
            return None;
        }
    };
    let opts = Opts::from_url(&url).expect("invalid test database url");
    Some(Pool::new(opts))
}

#[tokio::test]
async fn uuid_crud_round_trip() {
    let Some(pool) = test_pool() else { return };
    db::create_tables(&pool).await.unwrap();

    let dal = UuidDal::new(pool.clone());
    let key = Uuid::new_v4().to_string();
    let record = UuidRecord {
        uuid: key.clone(),
        name: "RoundTrip".to_string(),
        email: "round@test.com".to_string(),
        nickname: "trip".to_string(),
    };
    dal.create(&record).await.unwrap();
    assert_eq!(dal.get_by_uuid(&key).await.unwrap(), record);

    let updated = UuidRecord {
        nickname: "looped".to_string(),
        ..record.clone()
    };
    dal.update(&updated).await.unwrap();
    assert_eq!(dal.get_by_uuid(&key).await.unwrap(), updated);

    dal.delete(&key).await.unwrap();
    assert!(dal.get_by_uuid(&key).await.is_err());

    pool.disconnect().await.unwrap();
}

#[tokio::test]
async fn crc32_crud_round_trip() {
    let Some(pool) = test_pool() else { return };
    db::create_tables(&pool).await.unwrap();

    let dal = Crc32Dal::new(pool.clone());
    let record = Crc32Record::new(
        Uuid::new_v4().to_string(),
        "RoundTrip".to_string(),
        "round@test.com".to_string(),
        "trip".to_string(),
    );
    dal.create(&record).await.unwrap();

    let loaded = dal.get_by_uuid(&record.uuid).await.unwrap();
    assert_eq!(loaded, record);
    assert_eq!(loaded.uuid_crc32, uuid_checksum(&loaded.uuid));

    let updated = Crc32Record::new(
        record.uuid.clone(),
        "RoundTrip".to_string(),
        "round@test.com".to_string(),
        "looped".to_string(),
    );
    dal.update(&updated).await.unwrap();
    assert_eq!(dal.get_by_uuid(&record.uuid).await.unwrap(), updated);

    dal.delete(&record.uuid).await.unwrap();
    assert!(dal.get_by_uuid(&record.uuid).await.is_err());

    pool.disconnect().await.unwrap();
}

#[tokio::test]
async fn crc32_writes_derive_the_checksum_from_the_uuid() {
    let Some(pool) = test_pool() else { return };
    db::create_tables(&pool).await.unwrap();

    let dal = Crc32Dal::new(pool.clone());

    // a record arriving with a corrupted checksum still lands under the
    // derived one, so the composite-key lookup finds it
    let mut record = Crc32Record::new(
        Uuid::new_v4().to_string(),
        "Derived".to_string(),
        "derived@test.com".to_string(),
        "sum".to_string(),
    );
    record.uuid_crc32 = 1;
    dal.create(&record).await.unwrap();
    let loaded = dal.get_by_uuid(&record.uuid).await.unwrap();
    assert_eq!(loaded.uuid_crc32, uuid_checksum(&record.uuid));
    dal.delete(&record.uuid).await.unwrap();

    let mut batch: Vec<Crc32Record> = (0..5)
        .map(|i| {
            Crc32Record::new(
                Uuid::new_v4().to_string(),
                format!("Derived_{i}"),
                format!("derived_{i}@test.com"),
                format!("sum{i}"),
            )
        })
        .collect();
    for record in &mut batch {
        record.uuid_crc32 = 1;
    }
    dal.insert_batch(&batch).await.unwrap();
    for record in &batch {
        let loaded = dal.get_by_uuid(&record.uuid).await.unwrap();
        assert_eq!(loaded.uuid_crc32, uuid_checksum(&record.uuid));
        dal.delete(&record.uuid).await.unwrap();
    }
    pool.disconnect().await.unwrap();
}

#[tokio::test]
async fn snowflake_crud_round_trip_assigns_ids() {
    let Some(pool) = test_pool() else { return };
    db::create_tables(&pool).await.unwrap();

    let dal = SnowflakeDal::new(pool.clone()).unwrap();
    let mut record = SnowflakeRecord {
        id: 0,
        name: "RoundTrip".to_string(),
        email: "round@test.com".to_string(),
        nickname: "trip".to_string(),
    };
    dal.create(&mut record).await.unwrap();
    assert_ne!(record.id, 0, "create must assign an id");
    assert_eq!(dal.get_by_id(record.id).await.unwrap(), record);

    let updated = SnowflakeRecord {
        nickname: "looped".to_string(),
        ..record.clone()
    };
    dal.update(&updated).await.unwrap();
    assert_eq!(dal.get_by_id(record.id).await.unwrap(), updated);

    dal.delete(record.id).await.unwrap();
    assert!(dal.get_by_id(record.id).await.is_err());

    pool.disconnect().await.unwrap();
}

#[tokio::test]
async fn uuid_batch_insert_lands_every_row() {
    let Some(pool) = test_pool() else { return };
    db::create_tables(&pool).await.unwrap();

    let dal = UuidDal::new(pool.clone());
    let records: Vec<UuidRecord> = (0..25)
        .map(|i| UuidRecord {
            uuid: Uuid::new_v4().to_string(),
            name: format!("Batch_{i}"),
            email: format!("batch_{i}@test.com"),
            nickname: format!("b{i}"),
        })
        .collect();
    dal.insert_batch(&records).await.unwrap();

    for record in &records {
        assert_eq!(&dal.get_by_uuid(&record.uuid).await.unwrap(), record);
    }
    assert!(!dal.list(5, 0).await.unwrap().is_empty());

    for record in &records {
        dal.delete(&record.uuid).await.unwrap();
    }
    pool.disconnect().await.unwrap();
}

#[tokio::test]
async fn snowflake_batch_insert_assigns_distinct_ids() {
    let Some(pool) = test_pool() else { return };
    db::create_tables(&pool).await.unwrap();

    let dal = SnowflakeDal::new(pool.clone()).unwrap();
    let mut records: Vec<SnowflakeRecord> = (0..25)
        .map(|i| SnowflakeRecord {
            id: 0,
            name: format!("Batch_{i}"),
            email: format!("batch_{i}@test.com"),
            nickname: format!("b{i}"),
        })
        .collect();
    dal.insert_batch(&mut records).await.unwrap();

    let mut ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), records.len(), "every row needs its own id");

    for record in &records {
        assert_eq!(&dal.get_by_id(record.id).await.unwrap(), record);
        dal.delete(record.id).await.unwrap();
    }
    pool.disconnect().await.unwrap();
}

#[tokio::test]
async fn uuid_workloads_run_clean_at_small_scale() {
    let Some(pool) = test_pool() else { return };
    db::create_tables(&pool).await.unwrap();

    let opts = WorkloadOptions {
        operations: 64,
        concurrency: 8,
        batch_size: 16,
        batch_concurrency: 4,
    };
    let suite = UuidBench::new(UuidDal::new(pool.clone()));
    for workload in Workload::ALL {
        let outcome = suite.run(workload, &opts).await.unwrap();
        assert_eq!(outcome.total, 64, "{workload} should touch every row");
        assert_eq!(outcome.failed, 0, "{workload} should not fail");
    }
    pool.disconnect().await.unwrap();
}
