use regex::RegexBuilder;
use serde_json::Value;

use crate::collection::string_form;
use crate::errors::{ErrorKind, JsonDbError, JsonDbResult};
use crate::filter::Predicate;
use crate::{Record, KEY_NOT_EXIST};

/// Every record, in file order.
pub fn select_all(records: Vec<Record>) -> Vec<Record> {
    records
}

/// The records matching the predicate, in file order.
pub fn select_where(records: Vec<Record>, predicate: &Predicate) -> Vec<Record> {
    records
        .into_iter()
        .filter(|record| predicate.matches(record))
        .collect()
}

pub fn select_first_where(records: Vec<Record>, predicate: &Predicate) -> Option<Record> {
    records.into_iter().find(|record| predicate.matches(record))
}

pub fn count_where(records: &[Record], predicate: &Predicate) -> usize {
    if predicate.is_empty() {
        return records.len();
    }
    records.iter().filter(|record| predicate.matches(record)).count()
}

/// Records whose `field` contains `keyword`, ignoring case.
///
/// The keyword is matched literally. Non-string field values are searched in
/// their JSON text form, and records without the field are skipped.
pub fn search(records: Vec<Record>, field: &str, keyword: &str) -> JsonDbResult<Vec<Record>> {
    let pattern = RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
        .map_err(|e| {
            log::error!("Failed to build search pattern for {}: {}", keyword, e);
            JsonDbError::new(
                &format!("Invalid search keyword: {}", e),
                ErrorKind::InternalError,
            )
        })?;

    Ok(records
        .into_iter()
        .filter(|record| {
            record
                .get(field)
                .is_some_and(|value| pattern.is_match(&string_form(value)))
        })
        .collect())
}

/// Values of `field` for every record that has it.
pub fn field_values(records: Vec<Record>, field: &str) -> JsonDbResult<Vec<Value>> {
    let values: Vec<Value> = records
        .into_iter()
        .filter_map(|mut record| record.remove(field))
        .collect();

    if values.is_empty() {
        return Err(key_not_found(field));
    }
    Ok(values)
}

/// Records that have `field`.
pub fn search_by_field(records: Vec<Record>, field: &str) -> JsonDbResult<Vec<Record>> {
    let found: Vec<Record> = records
        .into_iter()
        .filter(|record| record.contains_key(field))
        .collect();

    if found.is_empty() {
        return Err(key_not_found(field));
    }
    Ok(found)
}

fn key_not_found(field: &str) -> JsonDbError {
    log::debug!("No record has field {}", field);
    JsonDbError::new(KEY_NOT_EXIST, ErrorKind::KeyNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::field;
    use serde_json::json;

    fn rows() -> Vec<Record> {
        [
            json!({ "name": "Sanan", "age": 24, "id": 1 }),
            json!({ "name": "Junaid", "age": 32, "id": 2 }),
            json!({ "name": "Ali", "age": 5, "id": 3 }),
            json!({ "title": "no name", "id": 4 }),
        ]
        .into_iter()
        .map(|value| value.as_object().cloned().unwrap())
        .collect()
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().map(|r| r["id"].as_u64().unwrap()).collect()
    }

    #[test]
    fn test_select_all_keeps_order() {
        assert_eq!(ids(&select_all(rows())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_select_where_greater_than() {
        let predicate = Predicate::parse(&json!({ "age": { "$gt": 20 } })).unwrap();
        assert_eq!(ids(&select_where(rows(), &predicate)), vec![1, 2]);
    }

    #[test]
    fn test_select_where_equality() {
        let predicate = Predicate::parse(&json!({ "age": 24 })).unwrap();
        assert_eq!(ids(&select_where(rows(), &predicate)), vec![1]);
    }

    #[test]
    fn test_select_where_empty_result() {
        let predicate = field("age").gt(100);
        assert!(select_where(rows(), &predicate).is_empty());
    }

    #[test]
    fn test_select_first_where() {
        let predicate = field("age").lt(30);
        let first = select_first_where(rows(), &predicate).unwrap();
        assert_eq!(first["id"], json!(1));
        assert!(select_first_where(rows(), &field("age").gt(99)).is_none());
    }

    #[test]
    fn test_count_where() {
        assert_eq!(count_where(&rows(), &Predicate::default()), 4);
        assert_eq!(count_where(&rows(), &field("age").gt(20)), 2);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let found = search(rows(), "name", "AN").unwrap();
        assert_eq!(ids(&found), vec![1, 2]);
    }

    #[test]
    fn test_search_keyword_is_literal() {
        let mut records = rows();
        records.push(json!({ "name": "a.b", "id": 5 }).as_object().cloned().unwrap());
        let found = search(records, "name", ".").unwrap();
        assert_eq!(ids(&found), vec![5]);
    }

    #[test]
    fn test_search_non_string_values() {
        let found = search(rows(), "age", "2").unwrap();
        assert_eq!(ids(&found), vec![1, 2]);
    }

    #[test]
    fn test_search_skips_records_without_field() {
        let found = search(rows(), "title", "name").unwrap();
        assert_eq!(ids(&found), vec![4]);
        assert!(search(rows(), "missing", "x").unwrap().is_empty());
    }

    #[test]
    fn test_field_values() {
        let values = field_values(rows(), "name").unwrap();
        assert_eq!(values, vec![json!("Sanan"), json!("Junaid"), json!("Ali")]);

        let err = field_values(rows(), "missing").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::KeyNotFound);
        assert_eq!(err.message(), KEY_NOT_EXIST);
    }

    #[test]
    fn test_search_by_field() {
        assert_eq!(ids(&search_by_field(rows(), "title").unwrap()), vec![4]);
        let err = search_by_field(Vec::new(), "title").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::KeyNotFound);
    }
}
