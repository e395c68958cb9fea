use jsondb::errors::ErrorKind;
use jsondb::{RECORD_NOT_FOUND, UPDATED_SUCCESSFULLY};
use jsondb_int_test::test_util::{cleanup, create_test_context, insert_test_records, run_test};
use serde_json::json;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_update_first_match_only() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_records(&db, "users")?;

            let outcome = db.update(
                "users",
                &json!({ "city": "Lahore" }),
                &json!({ "city": "Islamabad", "verified": true }),
            )?;
            assert_eq!(outcome.message(), UPDATED_SUCCESSFULLY);
            assert_eq!(outcome.data()["name"], json!("Sanan"));

            let records = db.get_all("users")?.into_data();
            assert_eq!(records[0]["city"], json!("Islamabad"));
            assert_eq!(records[0]["verified"], json!(true));
            assert_eq!(records[2]["city"], json!("Lahore"));
            assert!(records[2].get("verified").is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_keeps_other_fields_and_id() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_records(&db, "users")?;
            let before = db.find_one("users", &json!({ "name": "Junaid" }))?.into_data();

            db.update("users", &json!({ "name": "Junaid" }), &json!({ "age": 33, "id": 1 }))?;

            let after = db.find_one("users", &json!({ "name": "Junaid" }))?.into_data();
            assert_eq!(after["id"], before["id"]);
            assert_eq!(after["age"], json!(33));
            assert_eq!(after["tags"], before["tags"]);
            assert_eq!(after["city"], before["city"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_with_operator() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_records(&db, "users")?;

            let updated = db
                .update("users", &json!({ "age": { "$lt": 10 } }), &json!({ "minor": true }))?
                .into_data();
            assert_eq!(updated["name"], json!("Ali"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_no_match() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_records(&db, "users")?;

            let err = db
                .update("users", &json!({ "name": "Nobody" }), &json!({ "age": 1 }))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::RecordNotFound);
            assert_eq!(err.message(), RECORD_NOT_FOUND);
            assert!(err.is_record_not_found());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_requires_conditions() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_records(&db, "users")?;

            let err = db.update("users", &json!({}), &json!({ "age": 1 })).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidPredicate);

            let err = db.update("users", &json!("Sanan"), &json!({ "age": 1 })).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidPredicate);

            let err = db
                .update("users", &json!({ "name": "Sanan" }), &json!(["age", 1]))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);

            let ages = db.get_field_values("users", "age")?.into_data();
            assert_eq!(ages, vec![json!(24), json!(32), json!(5)]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_many() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_records(&db, "users")?;

            let updated = db
                .update_many("users", &json!({ "city": "Lahore" }), &json!({ "region": "Punjab" }))?
                .into_data();
            assert_eq!(updated.len(), 2);

            let found = db.filter("users", &json!({ "region": "Punjab" }))?.into_data();
            assert_eq!(found.len(), 2);

            let err = db
                .update_many("users", &json!({ "city": "Oslo" }), &json!({ "region": "x" }))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NoMatchingRows);
            Ok(())
        },
        cleanup,
    )
}
