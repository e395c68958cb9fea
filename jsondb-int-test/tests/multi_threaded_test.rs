use jsondb::filter::field;
use jsondb_int_test::test_util::{cleanup, create_test_context, run_test};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_multi_threaded_insert() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.create_collection("test")?;

            let num_threads = 5;
            let inserts_per_thread = 10;
            let barrier = Arc::new(Barrier::new(num_threads));

            let mut handles = vec![];
            for thread_id in 0..num_threads {
                let db = db.clone();
                let barrier = Arc::clone(&barrier);

                handles.push(thread::spawn(move || {
                    barrier.wait();
                    for i in 0..inserts_per_thread {
                        let row = json!({
                            "thread_id": thread_id,
                            "sequence": i,
                            "value": format!("thread_{}_seq_{}", thread_id, i)
                        });
                        db.insert_one("test", row).expect("insert failed");
                    }
                }));
            }

            for handle in handles {
                handle.join().expect("writer thread panicked");
            }

            let records = db.get_all("test")?.into_data();
            assert_eq!(records.len(), num_threads * inserts_per_thread);

            let ids: HashSet<u64> = records
                .iter()
                .filter_map(|record| record["id"].as_u64())
                .collect();
            assert_eq!(ids.len(), records.len());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_concurrent_readers_and_writers() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let collection = db.collection("test")?;
            collection.create()?;

            let writers: Vec<_> = (0..3)
                .map(|writer| {
                    let collection = collection.clone();
                    thread::spawn(move || {
                        for i in 0..20 {
                            collection
                                .insert_one(json!({ "writer": writer, "n": i }))
                                .expect("insert failed");
                        }
                    })
                })
                .collect();

            let readers: Vec<_> = (0..3)
                .map(|_| {
                    let collection = collection.clone();
                    thread::spawn(move || {
                        for _ in 0..20 {
                            // every snapshot must parse, never a half written file
                            if let Err(err) = collection.get_all() {
                                panic!("read failed: {}", err);
                            }
                        }
                    })
                })
                .collect();

            for handle in writers.into_iter().chain(readers) {
                handle.join().expect("worker thread panicked");
            }

            assert_eq!(collection.count()?.into_data(), 60);
            for writer in 0..3 {
                let found = collection.filter_by(&field("writer").eq(writer))?.into_data();
                assert_eq!(found.len(), 20);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_concurrent_updates_are_not_lost() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.create_collection("counters")?;
            db.insert_many(
                "counters",
                (0..4).map(|slot| json!({ "slot": slot, "hits": 0 })).collect(),
            )?;

            let handles: Vec<_> = (0..4)
                .map(|slot| {
                    let db = db.clone();
                    thread::spawn(move || {
                        for hit in 1..=10 {
                            db.update(
                                "counters",
                                &json!({ "slot": slot }),
                                &json!({ "hits": hit }),
                            )
                            .expect("update failed");
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().expect("updater thread panicked");
            }

            let hits = db.get_field_values("counters", "hits")?.into_data();
            assert_eq!(hits, vec![json!(10); 4]);
            Ok(())
        },
        cleanup,
    )
}
