// record constants
pub const ID_FIELD: &str = "id";
pub const COLLECTION_FILE_EXTENSION: &str = "json";
pub const DATABASE_DIR_NAME: &str = "database";

// operator constants
pub const OPERATOR_PREFIX: char = '$';
pub const GREATER_THAN: &str = "$gt";
pub const LESS_THAN: &str = "$lt";

// result messages
pub const SAVE_SUCCESS_MESSAGE: &str = "Data saved successfully!";
pub const SAVE_ERROR_MESSAGE: &str = "Error in saving data!";
pub const COLLECTION_CREATED: &str = "Collection created successfully!";
pub const COLLECTION_EXISTS: &str = "Collection already exists!";
pub const COLLECTION_NOT_EXISTS: &str = "Collection does not exist!";
pub const COLLECTION_CLEAR_SUCCESS: &str = "Collection cleared successfully!";
pub const COLLECTION_DELETED: &str = "Collection deleted successfully!";
pub const COLLECTION_VALID: &str = "Collection file is valid!";
pub const COLLECTION_INVALID: &str = "Collection file is not valid JSON!";
pub const KEY_NOT_EXIST: &str = "The key/field given does not exist.";
pub const RECORD_NOT_FOUND: &str = "Record not found!";
pub const NO_MATCHING_ROWS: &str = "No matching rows found!";
pub const RECORD_DELETED: &str = "Record deleted successfully!";
pub const RECORDS_DELETED: &str = "Records deleted successfully!";
pub const RECORDS_FOUND: &str = "Records fetched successfully!";
pub const UPDATED_SUCCESSFULLY: &str = "Updated successfully!";
