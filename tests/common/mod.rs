#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use secret_rotation::{Generator, GeneratorError, GeneratorOptions, SecretStore, StoreError};

pub const SECRET_ARN: &str = "arn:aws:secretsmanager:us-east-1:123456789012:secret:test-secret-id";

/// How the test store answers reads
pub enum ReadBehavior {
    Body(String),
    NotFound,
    Slow(Duration),
}

/// In-memory store that records every call
pub struct RecordingStore {
    read: ReadBehavior,
    fail_writes: bool,
    pub reads: AtomicUsize,
    pub writes: Mutex<Vec<(String, String)>>,
}

impl RecordingStore {
    pub fn new(read: ReadBehavior) -> Self {
        Self {
            read,
            fail_writes: false,
            reads: AtomicUsize::new(0),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_body(body: &str) -> Self {
        Self::new(ReadBehavior::Body(body.to_string()))
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SecretStore for RecordingStore {
    async fn get_secret_value(&self, secret_id: &str) -> Result<String, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match &self.read {
            ReadBehavior::Body(body) => Ok(body.clone()),
            ReadBehavior::NotFound => Err(StoreError::NotFound(secret_id.to_string())),
            ReadBehavior::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("{}".to_string())
            }
        }
    }

    async fn put_secret_value(&self, secret_id: &str, body: &str) -> Result<String, StoreError> {
        if self.fail_writes {
            return Err(StoreError::AccessDenied(secret_id.to_string()));
        }
        let mut writes = self.writes.lock().unwrap();
        writes.push((secret_id.to_string(), body.to_string()));
        Ok(format!("version-{}", writes.len()))
    }

    fn store_type(&self) -> &'static str {
        "Recording test store"
    }
}

/// Generator returning numbered values and counting its calls
#[derive(Default)]
pub struct CountingGenerator {
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl CountingGenerator {
    pub fn failing_on(call: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on_call: Some(call),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Generator for CountingGenerator {
    fn generate(&self, _opts: &GeneratorOptions) -> Result<String, GeneratorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(GeneratorError::EmptyCharset);
        }
        Ok(format!("generated-{}", call))
    }
}
