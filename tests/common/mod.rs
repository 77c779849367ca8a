//! Test helpers for mail dispatch tests.
//!
//! Provides recording stubs for the gate, transport and log sink.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use usermail::mail::{
    BlockedRecipientGate, GateError, LogLevel, LogSink, LogSinkError, MailDispatchWorker,
    MailQueue, MailTransport, MessageType, Placeholders, TransportError,
};

/// Default timeout for test operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Gate that keeps blocked recipients in memory and records calls.
#[derive(Default)]
pub struct RecordingGate {
    blocked: Mutex<HashSet<String>>,
    /// Recipients whose `is_blocked` check fails.
    failing: Mutex<HashSet<String>>,
    /// Recipients whose `is_blocked` check panics.
    panicking: Mutex<HashSet<String>>,
    pub checks: AtomicUsize,
    pub block_calls: Mutex<Vec<String>>,
}

impl RecordingGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocked(recipient: &str) -> Self {
        let gate = Self::default();
        gate.blocked.lock().unwrap().insert(recipient.to_string());
        gate
    }

    pub fn failing_for(recipient: &str) -> Self {
        let gate = Self::default();
        gate.failing.lock().unwrap().insert(recipient.to_string());
        gate
    }

    pub fn panicking_for(recipient: &str) -> Self {
        let gate = Self::default();
        gate.panicking.lock().unwrap().insert(recipient.to_string());
        gate
    }

    pub fn block_calls(&self) -> Vec<String> {
        self.block_calls.lock().unwrap().clone()
    }

    pub fn is_blocked_now(&self, recipient: &str) -> bool {
        self.blocked.lock().unwrap().contains(recipient)
    }
}

#[async_trait]
impl BlockedRecipientGate for RecordingGate {
    async fn is_blocked(&self, recipient: &str) -> Result<bool, GateError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.panicking.lock().unwrap().contains(recipient) {
            panic!("gate backend crashed for {}", recipient);
        }
        if self.failing.lock().unwrap().contains(recipient) {
            return Err(GateError::Storage("database is locked".to_string()));
        }
        Ok(self.blocked.lock().unwrap().contains(recipient))
    }

    async fn block(&self, recipient: &str) -> Result<(), GateError> {
        self.block_calls.lock().unwrap().push(recipient.to_string());
        self.blocked.lock().unwrap().insert(recipient.to_string());
        Ok(())
    }
}

/// Transport that records every send and succeeds or fails on demand.
pub struct RecordingTransport {
    fail: bool,
    pub sent: Mutex<Vec<(String, MessageType)>>,
}

impl RecordingTransport {
    pub fn succeeding() -> Self {
        Self {
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sends(&self) -> Vec<(String, MessageType)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(
        &self,
        recipient: &str,
        message_type: MessageType,
        _placeholders: &Placeholders,
    ) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), message_type));
        if self.fail {
            Err(TransportError::Smtp("550 mailbox unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Log sink that keeps entries in memory.
#[derive(Default)]
pub struct MemoryLogSink {
    pub entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }
}

#[async_trait]
impl LogSink for MemoryLogSink {
    async fn write_log(&self, level: LogLevel, message: &str) -> Result<(), LogSinkError> {
        self.entries
            .lock()
            .unwrap()
            .push((level, message.to_string()));
        Ok(())
    }
}

/// Stubs and worker wired to a shared queue.
pub struct Harness {
    pub queue: Arc<MailQueue>,
    pub gate: Arc<RecordingGate>,
    pub transport: Arc<RecordingTransport>,
    pub sink: Arc<MemoryLogSink>,
}

impl Harness {
    pub fn new(gate: RecordingGate, transport: RecordingTransport) -> Self {
        Self {
            queue: Arc::new(MailQueue::new()),
            gate: Arc::new(gate),
            transport: Arc::new(transport),
            sink: Arc::new(MemoryLogSink::new()),
        }
    }

    /// Build a worker over the shared stubs.
    pub fn worker(&self, pacing_delay: Duration) -> MailDispatchWorker {
        MailDispatchWorker::new(
            self.queue.clone(),
            self.gate.clone(),
            self.transport.clone(),
            self.sink.clone(),
        )
        .with_pacing_delay(pacing_delay)
    }
}

/// Poll `condition` until it holds or the default timeout elapses.
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = tokio::time::Instant::now() + DEFAULT_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
