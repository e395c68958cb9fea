use jsondb::collection::JsonCollection;
use jsondb::errors::{ErrorKind, JsonDbError, JsonDbResult};
use jsondb::JsonDb;
use serde_json::json;
use std::backtrace::Backtrace;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use std::{env, fs, thread};

/// Runs a test with retry logic and error handling.
/// `after` runs even when the test fails, so the test directory is always removed.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> JsonDbResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> JsonDbResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> JsonDbResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| -> Result<(), (String, String)> {
            let backtrace = Backtrace::capture();
            let ctx = before()
                .map_err(|e| (format!("Before run failed: {:?}", e), backtrace.to_string()))?;

            match test(ctx.clone()) {
                Ok(_) => after(ctx)
                    .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            }
        });

        let elapsed = start_time.elapsed();

        let error = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, _backtrace))) => e,
            Err(panic_err) => {
                let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                format!("Panic: {}", err_msg)
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", error);
            thread::sleep(Duration::from_millis(50 * attempt as u64));
        }
        last_error = Some(error);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

#[derive(Clone)]
pub struct TestContext {
    path: PathBuf,
    db: JsonDb,
}

impl TestContext {
    pub fn new(path: PathBuf, db: JsonDb) -> Self {
        Self { path, db }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn db(&self) -> JsonDb {
        self.db.clone()
    }

    /// Path of the file backing a collection.
    pub fn collection_file(&self, name: &str) -> PathBuf {
        self.path.join(format!("{}.json", name))
    }
}

pub fn random_path() -> PathBuf {
    let id = uuid::Uuid::new_v4();
    env::temp_dir().join("jsondb-test").join(id.to_string())
}

/// Opens a store on a fresh directory under the system temp directory.
pub fn create_test_context() -> JsonDbResult<TestContext> {
    let path = random_path();
    if path.exists() {
        let _ = fs::remove_dir_all(&path);
    }

    let db = JsonDb::builder().base_dir(&path).open().map_err(|e| {
        JsonDbError::new_with_cause("Failed to create test context", ErrorKind::InternalError, e)
    })?;
    Ok(TestContext::new(path, db))
}

pub fn cleanup(ctx: TestContext) -> JsonDbResult<()> {
    match fs::remove_dir_all(ctx.path()) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            eprintln!(
                "Warning: Failed to remove test directory {:?}: {:?}",
                ctx.path(),
                e
            );
            Ok(())
        }
    }
}

/// Creates `name` holding three people: Sanan (24), Junaid (32) and Ali (5).
pub fn insert_test_records(db: &JsonDb, name: &str) -> JsonDbResult<JsonCollection> {
    let collection = db.collection(name)?;
    collection.create()?;
    collection.insert_many(vec![
        json!({ "name": "Sanan", "age": 24, "city": "Lahore", "tags": ["admin", "dev"] }),
        json!({ "name": "Junaid", "age": 32, "city": "Karachi", "tags": ["dev"] }),
        json!({ "name": "Ali", "age": 5, "city": "Lahore" }),
    ])?;
    Ok(collection)
}
