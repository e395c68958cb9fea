use serde_json::Value;

use crate::collection::operation::WriteResult;
use crate::common::Outcome;
use crate::errors::JsonDbResult;
use crate::filter::Predicate;
use crate::jsondb::JsonDb;
use crate::Record;

/// A [JsonDb] bound to one collection name.
///
/// ```rust,ignore
/// let users = db.collection("users")?;
/// users.create()?;
/// users.insert_one(json!({ "name": "Sanan", "age": 24 }))?;
/// let adults = users.filter_by(&field("age").gt(17))?.into_data();
/// ```
#[derive(Clone)]
pub struct JsonCollection {
    db: JsonDb,
    name: String,
}

impl JsonCollection {
    pub(crate) fn new(db: JsonDb, name: &str) -> Self {
        JsonCollection {
            db,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create(&self) -> JsonDbResult<Outcome<()>> {
        self.db.create_collection(&self.name)
    }

    /// Deletes the backing file.
    pub fn drop_collection(&self) -> JsonDbResult<Outcome<()>> {
        self.db.delete_collection(&self.name)
    }

    pub fn clear(&self) -> JsonDbResult<Outcome<()>> {
        self.db.clear_collection(&self.name)
    }

    pub fn exists(&self) -> bool {
        self.db.exists(&self.name)
    }

    pub fn valid(&self) -> JsonDbResult<Outcome<bool>> {
        self.db.valid(&self.name)
    }

    pub fn insert_one(&self, row: Value) -> JsonDbResult<Outcome<WriteResult>> {
        self.db.insert_one(&self.name, row)
    }

    pub fn insert_many(&self, rows: Vec<Value>) -> JsonDbResult<Outcome<WriteResult>> {
        self.db.insert_many(&self.name, rows)
    }

    pub fn get_all(&self) -> JsonDbResult<Outcome<Vec<Record>>> {
        self.db.get_all(&self.name)
    }

    pub fn count(&self) -> JsonDbResult<Outcome<usize>> {
        self.db.count(&self.name)
    }

    pub fn filter(&self, where_clause: &Value) -> JsonDbResult<Outcome<Vec<Record>>> {
        self.db.filter(&self.name, where_clause)
    }

    pub fn filter_by(&self, predicate: &Predicate) -> JsonDbResult<Outcome<Vec<Record>>> {
        self.db.filter_by(&self.name, predicate)
    }

    pub fn find_one(&self, where_clause: &Value) -> JsonDbResult<Outcome<Record>> {
        self.db.find_one(&self.name, where_clause)
    }

    pub fn search(&self, field: &str, keyword: &str) -> JsonDbResult<Outcome<Vec<Record>>> {
        self.db.search(&self.name, field, keyword)
    }

    pub fn get_field_values(&self, field: &str) -> JsonDbResult<Outcome<Vec<Value>>> {
        self.db.get_field_values(&self.name, field)
    }

    pub fn search_by_field(&self, field: &str) -> JsonDbResult<Outcome<Vec<Record>>> {
        self.db.search_by_field(&self.name, field)
    }

    pub fn update(&self, where_clause: &Value, set_clause: &Value) -> JsonDbResult<Outcome<Record>> {
        self.db.update(&self.name, where_clause, set_clause)
    }

    pub fn update_many(
        &self,
        where_clause: &Value,
        set_clause: &Value,
    ) -> JsonDbResult<Outcome<Vec<Record>>> {
        self.db.update_many(&self.name, where_clause, set_clause)
    }

    pub fn delete_one(&self, where_clause: &Value) -> JsonDbResult<Outcome<Record>> {
        self.db.delete_one(&self.name, where_clause)
    }

    pub fn delete_many(&self, where_clause: &Value) -> JsonDbResult<Outcome<Vec<Record>>> {
        self.db.delete_many(&self.name, where_clause)
    }
}

#[cfg(test)]
mod tests {
    use crate::filter::field;
    use crate::JsonDb;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_collection_handle_round_trip() {
        let dir = TempDir::new().unwrap();
        let db = JsonDb::builder().base_dir(dir.path()).open().unwrap();
        let users = db.collection("users").unwrap();
        assert_eq!(users.name(), "users");
        assert!(!users.exists());

        users.create().unwrap();
        users
            .insert_many(vec![json!({ "name": "Sanan", "age": 24 }), json!({ "name": "Ali", "age": 5 })])
            .unwrap();

        let adults = users.filter_by(&field("age").gt(17)).unwrap().into_data();
        assert_eq!(adults.len(), 1);
        assert_eq!(adults[0]["name"], json!("Sanan"));

        users.update(&json!({ "name": "Ali" }), &json!({ "age": 6 })).unwrap();
        assert_eq!(users.find_one(&json!({ "name": "Ali" })).unwrap().data()["age"], json!(6));

        users.clear().unwrap();
        assert_eq!(users.count().unwrap().into_data(), 0);
        users.drop_collection().unwrap();
        assert!(!users.exists());
    }
}
