/// The result of an insert.
///
/// `WriteResult` holds the ids assigned to the inserted records, in the order
/// the records were given.
///
/// # Examples
///
/// ```rust,ignore
/// let result = db.insert_one("users", json!({ "name": "Sanan" }))?.into_data();
/// for id in result.affected_ids() {
///     println!("Inserted record with id: {}", id);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    ids: Vec<u64>,
}

impl WriteResult {
    pub fn new(ids: Vec<u64>) -> Self {
        Self { ids }
    }

    pub fn affected_ids(&self) -> &[u64] {
        &self.ids
    }

    /// Id of the first inserted record.
    pub fn first_id(&self) -> Option<u64> {
        self.ids.first().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl IntoIterator for WriteResult {
    type Item = u64;
    type IntoIter = std::vec::IntoIter<u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}
