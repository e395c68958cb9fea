use serde_json::Value;

use crate::collection::{into_record, merge_set_clause, set_clause_fields, IdGenerator};
use crate::errors::{ErrorKind, JsonDbError, JsonDbResult};
use crate::filter::Predicate;
use crate::{Record, ID_FIELD, NO_MATCHING_ROWS, RECORD_NOT_FOUND};

/// Appends a row, assigning it a fresh id. Any `id` the row carried is replaced.
pub fn insert(records: &mut Vec<Record>, row: Value, ids: &IdGenerator) -> JsonDbResult<u64> {
    let mut record = into_record(row)?;
    let id = assign_id(&mut record, ids);
    records.push(record);
    Ok(id)
}

/// Appends several rows. Nothing is appended unless every row is an object.
pub fn insert_batch(
    records: &mut Vec<Record>,
    rows: Vec<Value>,
    ids: &IdGenerator,
) -> JsonDbResult<Vec<u64>> {
    let new_records = rows
        .into_iter()
        .map(into_record)
        .collect::<JsonDbResult<Vec<Record>>>()?;

    records.reserve(new_records.len());
    let mut assigned = Vec::with_capacity(new_records.len());
    for mut record in new_records {
        assigned.push(assign_id(&mut record, ids));
        records.push(record);
    }
    Ok(assigned)
}

/// Merges the set-clause into the first matching record and returns it.
pub fn update_first_match(
    records: &mut [Record],
    predicate: &Predicate,
    set_clause: &Value,
) -> JsonDbResult<Record> {
    let set_fields = set_clause_fields(set_clause)?;
    let Some(record) = records.iter_mut().find(|record| predicate.matches(record)) else {
        return Err(record_not_found(predicate));
    };

    merge_set_clause(record, set_fields);
    Ok(record.clone())
}

/// Merges the set-clause into every matching record and returns the updated records.
pub fn update_all_matches(
    records: &mut [Record],
    predicate: &Predicate,
    set_clause: &Value,
) -> JsonDbResult<Vec<Record>> {
    let set_fields = set_clause_fields(set_clause)?;
    let mut updated = Vec::new();
    for record in records.iter_mut().filter(|record| predicate.matches(record)) {
        merge_set_clause(record, set_fields);
        updated.push(record.clone());
    }

    if updated.is_empty() {
        return Err(no_matching_rows(predicate));
    }
    Ok(updated)
}

/// Removes the first matching record and returns it.
pub fn delete_first_match(records: &mut Vec<Record>, predicate: &Predicate) -> JsonDbResult<Record> {
    match records.iter().position(|record| predicate.matches(record)) {
        Some(index) => Ok(records.remove(index)),
        None => Err(record_not_found(predicate)),
    }
}

/// Removes every matching record and returns them. The remaining records keep
/// their relative order.
pub fn delete_all_matches(
    records: &mut Vec<Record>,
    predicate: &Predicate,
) -> JsonDbResult<Vec<Record>> {
    let (removed, kept): (Vec<Record>, Vec<Record>) = std::mem::take(records)
        .into_iter()
        .partition(|record| predicate.matches(record));
    *records = kept;

    if removed.is_empty() {
        return Err(no_matching_rows(predicate));
    }
    Ok(removed)
}

/// The record sequence a cleared collection holds. The previous records are
/// never consulted.
pub fn clear() -> Vec<Record> {
    Vec::new()
}

fn assign_id(record: &mut Record, ids: &IdGenerator) -> u64 {
    let id = ids.next_id();
    record.insert(ID_FIELD.to_string(), Value::from(id));
    id
}

fn record_not_found(predicate: &Predicate) -> JsonDbError {
    log::debug!("No record matches {}", predicate);
    JsonDbError::new(RECORD_NOT_FOUND, ErrorKind::RecordNotFound)
}

fn no_matching_rows(predicate: &Predicate) -> JsonDbError {
    log::debug!("No rows match {}", predicate);
    JsonDbError::new(NO_MATCHING_ROWS, ErrorKind::NoMatchingRows)
}
