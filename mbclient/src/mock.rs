//! In-memory transport used by the test suite. Scripted listen outcomes play
//! back in order; a [`MockHandle`] keeps a view of everything the engine did
//! after the transport itself is boxed into a client.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::RequestError;
use crate::transport::Transport;

/// one scripted outcome of a `listen` call
#[derive(Debug, Clone)]
enum Playback {
    Respond(Vec<u8>),
    Fail(RequestError),
}

#[derive(Debug, Default)]
pub struct MockTransport {
    playback: VecDeque<Playback>,
    connect_error: Option<RequestError>,
    send_error: Option<RequestError>,
    sent: Arc<std::sync::Mutex<Vec<Vec<u8>>>>,
    connects: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    buffer: Arc<Mutex<Vec<u8>>>,
}

/// test-side view into a [`MockTransport`] owned by a client
#[derive(Debug, Clone)]
pub struct MockHandle {
    sent: Arc<std::sync::Mutex<Vec<Vec<u8>>>>,
    connects: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// queue response bytes for the next unanswered `listen`
    pub fn respond(mut self, frame: &[u8]) -> Self {
        self.playback.push_back(Playback::Respond(frame.to_vec()));
        self
    }

    /// queue a listen failure, e.g. `RequestError::ResponseTimeout`
    pub fn fail_listen(mut self, error: RequestError) -> Self {
        self.playback.push_back(Playback::Fail(error));
        self
    }

    pub fn fail_connect(mut self, error: RequestError) -> Self {
        self.connect_error = Some(error);
        self
    }

    pub fn fail_send(mut self, error: RequestError) -> Self {
        self.send_error = Some(error);
        self
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            sent: self.sent.clone(),
            connects: self.connects.clone(),
            closes: self.closes.clone(),
            buffer: self.buffer.clone(),
        }
    }
}

impl MockHandle {
    /// frames written by the engine, in order
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().expect("mock poisoned").clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// current contents of the response buffer
    pub async fn buffered(&self) -> Vec<u8> {
        self.buffer.lock().await.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<(), RequestError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match self.connect_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn send(&mut self, frame: &[u8]) -> Result<(), RequestError> {
        if let Some(err) = self.send_error {
            return Err(err);
        }
        self.sent
            .lock()
            .expect("mock poisoned")
            .push(frame.to_vec());
        Ok(())
    }

    async fn listen(&mut self) -> Result<(), RequestError> {
        match self.playback.pop_front() {
            Some(Playback::Respond(frame)) => {
                self.buffer.lock().await.extend_from_slice(&frame);
                Ok(())
            }
            Some(Playback::Fail(err)) => Err(err),
            // nothing scripted: behave like a silent device
            None => Err(RequestError::ResponseTimeout),
        }
    }

    fn buffer(&self) -> &Mutex<Vec<u8>> {
        &self.buffer
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
