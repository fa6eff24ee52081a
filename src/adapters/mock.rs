//! In-memory transport for tests and dry runs.
//!
//! A [`MockHandle`] shares state with every transport it hands out, so a test
//! can queue device replies and inspect what was written after the transport
//! has been moved into a device.

use crate::domain::model::SerialSettings;
use crate::domain::ports::{Transport, TransportOpener};
use crate::utils::error::Result;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    writes: Vec<Vec<u8>>,
    inbound: VecDeque<u8>,
    replies: Vec<(Vec<u8>, Vec<u8>)>,
    opened_with: Option<SerialSettings>,
    closed: bool,
    write_failure: Option<io::ErrorKind>,
}

#[derive(Debug, Clone, Default)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Bytes the device has "sent", readable immediately.
    pub fn push_inbound(&self, bytes: &[u8]) {
        self.lock().inbound.extend(bytes.iter().copied());
    }

    /// Queue `reply` whenever exactly `request` is written.
    pub fn reply_to(&self, request: &str, reply: &str) {
        self.lock()
            .replies
            .push((request.as_bytes().to_vec(), reply.as_bytes().to_vec()));
    }

    pub fn writes(&self) -> Vec<String> {
        self.lock()
            .writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    pub fn pending_inbound(&self) -> usize {
        self.lock().inbound.len()
    }

    pub fn opened_with(&self) -> Option<SerialSettings> {
        self.lock().opened_with.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Make every following write fail with `kind`.
    pub fn fail_writes(&self, kind: io::ErrorKind) {
        self.lock().write_failure = Some(kind);
    }
}

#[derive(Debug, Default)]
pub struct MockTransport {
    handle: MockHandle,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> MockHandle {
        self.handle.clone()
    }
}

impl Transport for MockTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut state = self.handle.lock();
        if let Some(kind) = state.write_failure {
            return Err(io::Error::new(kind, "mock write failure").into());
        }
        state.writes.push(bytes.to_vec());

        let reply = state
            .replies
            .iter()
            .find(|(request, _)| request.as_slice() == bytes)
            .map(|(_, reply)| reply.clone());
        if let Some(reply) = reply {
            state.inbound.extend(reply);
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.handle.lock().inbound.len())
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.handle
            .lock()
            .inbound
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::TimedOut, "no byte pending").into())
    }

    fn close(&mut self) -> Result<()> {
        self.handle.lock().closed = true;
        Ok(())
    }
}

/// Hands out [`MockTransport`]s that share one [`MockHandle`].
#[derive(Debug, Clone, Default)]
pub struct MockOpener {
    handle: MockHandle,
    refuse: bool,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// An opener whose `open` always fails, like a missing port.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn handle(&self) -> MockHandle {
        self.handle.clone()
    }
}

impl TransportOpener for MockOpener {
    fn open(&self, settings: &SerialSettings) -> Result<Box<dyn Transport>> {
        if self.refuse {
            return Err(io::Error::new(io::ErrorKind::NotFound, "mock port refused").into());
        }
        let mut state = self.handle.lock();
        state.opened_with = Some(settings.clone());
        state.closed = false;
        drop(state);

        Ok(Box::new(MockTransport {
            handle: self.handle.clone(),
        }))
    }
}
