use crate::errors::JsonDbResult;

/// The successful result of a collection operation.
///
/// `Outcome` pairs the data produced by an operation with the human readable
/// message describing it (for example `"Data saved successfully!"`).
///
/// # Examples
///
/// ```rust,ignore
/// let outcome = db.insert_one("users", json!({ "name": "Alice" }))?;
/// println!("{} -> {}", outcome.message(), outcome.data());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    data: T,
    message: &'static str,
}

impl<T> Outcome<T> {
    pub fn new(data: T, message: &'static str) -> Self {
        Outcome { data, message }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    /// Consumes the outcome and returns its data.
    pub fn into_data(self) -> T {
        self.data
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        Outcome {
            data: f(self.data),
            message: self.message,
        }
    }
}

/// The `(success, data, message)` triple of a finished operation.
///
/// Built from a [JsonDbResult] of an [Outcome]: a success keeps the data and the
/// outcome message, a failure carries no data and the error message.
///
/// ```rust,ignore
/// let response = Response::from(db.count("users"));
/// if response.success {
///     println!("{} users", response.data.unwrap_or_default());
/// } else {
///     eprintln!("error: {}", response.message);
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> From<JsonDbResult<Outcome<T>>> for Response<T> {
    fn from(result: JsonDbResult<Outcome<T>>) -> Self {
        match result {
            Ok(outcome) => Response {
                success: true,
                message: outcome.message.to_string(),
                data: Some(outcome.data),
            },
            Err(err) => Response {
                success: false,
                data: None,
                message: err.message().to_string(),
            },
        }
    }
}
