//! Live Capture Recorder
//!
//! Records from a camera/microphone device into an in-memory WebM asset.
//! The device is abstracted behind [`CaptureDevice`] so the core never
//! touches hardware directly; hosts plug in their platform capture layer.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::core::{CoreError, CoreResult};

use super::VideoAsset;

// =============================================================================
// Capture Device Trait
// =============================================================================

/// Trait for camera/microphone capture backends
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Returns the device name
    fn name(&self) -> &str;

    /// Opens the device and starts producing encoded chunks.
    ///
    /// Errors use the device variants of [`CoreError`]:
    /// `DeviceAccessDenied`, `DeviceNotFound`, or `DeviceError`.
    async fn start(&self) -> CoreResult<CaptureStream>;
}

/// Maps a device-access failure to the message shown to the user
pub fn device_error_message(error: &CoreError) -> &'static str {
    match error {
        CoreError::DeviceAccessDenied(_) => {
            "Camera and microphone permissions are required. Please allow access and try again."
        }
        CoreError::DeviceNotFound(_) => "No camera or microphone found on this device.",
        _ => "Could not start the camera. Please check your device and try again.",
    }
}

// =============================================================================
// Capture Stream
// =============================================================================

/// Live stream of encoded chunks from an open device.
///
/// Dropping the stream releases the device: the backend holds the other
/// half of `release_tx` and stops its tracks when it fires or closes.
#[derive(Debug)]
pub struct CaptureStream {
    chunks: mpsc::Receiver<Vec<u8>>,
    release_tx: Option<oneshot::Sender<()>>,
}

impl CaptureStream {
    /// Creates a stream from its channel halves (called by device backends)
    pub fn new(chunks: mpsc::Receiver<Vec<u8>>, release_tx: oneshot::Sender<()>) -> Self {
        Self {
            chunks,
            release_tx: Some(release_tx),
        }
    }

    /// Receives the next chunk, or `None` when the device has closed the stream
    pub async fn next_chunk(&mut self) -> Option<Vec<u8>> {
        self.chunks.recv().await
    }

    /// Signals the device to stop its tracks
    fn release(&mut self) {
        if let Some(tx) = self.release_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// Recording Session
// =============================================================================

/// Accumulates chunks from an open device until stopped
#[derive(Debug)]
pub struct RecordingSession {
    stream: CaptureStream,
    chunks: Vec<Vec<u8>>,
}

impl RecordingSession {
    /// Opens the device and begins recording
    pub async fn start(device: &dyn CaptureDevice) -> CoreResult<Self> {
        let stream = device.start().await?;
        tracing::info!("Recording started on device: {}", device.name());

        Ok(Self {
            stream,
            chunks: Vec::new(),
        })
    }

    /// Pumps one chunk from the device into the session buffer.
    ///
    /// Returns `false` once the device has closed the stream.
    pub async fn pump(&mut self) -> bool {
        match self.stream.next_chunk().await {
            Some(chunk) => {
                if !chunk.is_empty() {
                    self.chunks.push(chunk);
                }
                true
            }
            None => false,
        }
    }

    /// Number of chunks buffered so far
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Stops recording, releases the device, and assembles the asset.
    ///
    /// The asset is named `recording-{unix_millis}.webm` with MIME
    /// `video/webm`. Remaining in-flight chunks are drained first.
    pub async fn stop(mut self) -> CoreResult<VideoAsset> {
        self.stream.release();

        // Drain whatever the device flushed before closing
        while let Some(chunk) = self.stream.next_chunk().await {
            if !chunk.is_empty() {
                self.chunks.push(chunk);
            }
        }

        let total: usize = self.chunks.iter().map(|c| c.len()).sum();
        let mut data = Vec::with_capacity(total);
        for chunk in &self.chunks {
            data.extend_from_slice(chunk);
        }

        let name = format!("recording-{}.webm", chrono::Utc::now().timestamp_millis());
        tracing::info!("Recording stopped: {} ({} bytes)", name, data.len());

        Ok(VideoAsset::from_parts(name, "video/webm".to_string(), data))
    }
}

// =============================================================================
// Mock Capture Device (for testing)
// =============================================================================

/// Mock capture device with scripted chunks or a scripted failure
pub struct MockCaptureDevice {
    name: String,
    chunks: Vec<Vec<u8>>,
    failure: Option<fn(String) -> CoreError>,
    released: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl MockCaptureDevice {
    /// Creates a mock device that yields the given chunks then closes
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            chunks: Vec::new(),
            failure: None,
            released: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    /// Sets the scripted chunks
    pub fn with_chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks;
        self
    }

    /// Makes `start` fail with the given error constructor
    pub fn with_failure(mut self, failure: fn(String) -> CoreError) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Returns whether the stream released the device
    pub fn release_flag(&self) -> std::sync::Arc<std::sync::atomic::AtomicBool> {
        self.released.clone()
    }
}

#[async_trait]
impl CaptureDevice for MockCaptureDevice {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> CoreResult<CaptureStream> {
        if let Some(failure) = self.failure {
            return Err(failure(self.name.clone()));
        }

        let (chunk_tx, chunk_rx) = mpsc::channel(16);
        let (release_tx, release_rx) = oneshot::channel();

        let chunks = self.chunks.clone();
        let released = self.released.clone();
        tokio::spawn(async move {
            for chunk in chunks {
                if chunk_tx.send(chunk).await.is_err() {
                    break;
                }
            }
            // Hold the sender open until the session releases the device
            let _ = release_rx.await;
            released.store(true, std::sync::atomic::Ordering::SeqCst);
        });

        Ok(CaptureStream::new(chunk_rx, release_tx))
    }
}

// =============================================================================
// Tests
// =============================================================================
