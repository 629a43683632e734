// SPDX-License-Identifier: GPL-3.0-only

//! Scan session orchestration
//!
//! Wires a frame stream into a detector and, on the first accepted
//! detection, freezes that exact frame: planar YUV is repacked to NV21,
//! JPEG-encoded, orientation-normalized, and delivered together with the
//! decoded text through a consume-once result sink. The
//! [`coordinator`] module guarantees the session terminates at most once
//! no matter how many analysis callbacks race.
//!
//! Sessions move `Idle -> Awaiting -> Completed`; frames delivered after
//! completion are dropped (released) without side effects.

pub mod coordinator;

use crate::camera::types::FrameBuffer;
use crate::config::ScanConfig;
use crate::detect::{BarcodeFormat, Detector};
use crate::errors::CaptureError;
use crate::media::{jpeg, yuv};
use coordinator::CompletionCoordinator;
use futures::channel::oneshot;
use futures::{Stream, StreamExt};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Terminal outcome of one scan session
///
/// Exactly one instance is produced per session.
#[derive(Clone)]
pub enum CaptureResult {
    /// A payload was decoded and the matching frame frozen as JPEG
    Success {
        text: String,
        format: BarcodeFormat,
        jpeg: Vec<u8>,
    },
    /// The session terminated without a capture
    Failure { message: String },
}

impl CaptureResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CaptureResult::Success { .. })
    }
}

impl fmt::Debug for CaptureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureResult::Success { text, format, jpeg } => f
                .debug_struct("Success")
                .field("text", text)
                .field("format", format)
                .field("jpeg_bytes", &jpeg.len())
                .finish(),
            CaptureResult::Failure { message } => {
                f.debug_struct("Failure").field("message", message).finish()
            }
        }
    }
}

/// Supplies the "authorized to start" decision before a session opens
///
/// A denial surfaces as an immediate `Failure`; the session never accepts
/// a frame.
pub trait AuthorizationGate {
    fn authorized(&self) -> bool;
}

impl AuthorizationGate for bool {
    fn authorized(&self) -> bool {
        *self
    }
}

/// Factory for scan sessions over a fixed detector and configuration
pub struct ScanPipeline {
    detector: Arc<dyn Detector>,
    config: ScanConfig,
}

impl ScanPipeline {
    pub fn new(detector: Arc<dyn Detector>, config: ScanConfig) -> Self {
        Self { detector, config }
    }

    /// Open a new session
    ///
    /// When created inside a Tokio runtime, frame analysis runs on blocking
    /// worker threads; otherwise it runs inline on the delivering thread.
    pub fn begin(&self) -> ScanSession {
        let (coordinator, receiver) = CompletionCoordinator::new();
        let inner = Arc::new(SessionInner {
            coordinator,
            detector: Arc::clone(&self.detector),
            jpeg_quality: self.config.jpeg_quality,
            accept_empty_text: self.config.accept_empty_text,
            runtime: tokio::runtime::Handle::try_current().ok(),
        });

        debug!(
            jpeg_quality = self.config.jpeg_quality,
            "Scan session opened"
        );
        ScanSession { inner, receiver }
    }

    /// Open a session behind a permission gate
    ///
    /// On denial the session is born completed with an authorization
    /// failure: the coordinator never accepts a frame and any delivered
    /// frames are discarded.
    pub fn begin_gated(&self, gate: &dyn AuthorizationGate) -> ScanSession {
        let session = self.begin();
        if !gate.authorized() {
            warn!("camera authorization denied, session completed immediately");
            session.inner.coordinator.try_complete(CaptureResult::Failure {
                message: CaptureError::AuthorizationDenied.to_string(),
            });
        }
        session
    }
}

struct SessionInner {
    coordinator: CompletionCoordinator,
    detector: Arc<dyn Detector>,
    jpeg_quality: u8,
    accept_empty_text: bool,
    runtime: Option<tokio::runtime::Handle>,
}

impl SessionInner {
    /// Analyze one frame; consumes (releases) it on every path
    fn analyze(&self, frame: FrameBuffer) {
        if self.coordinator.is_complete() {
            trace!("frame arrived after completion, discarding");
            return;
        }

        match self.detector.detect(&frame) {
            Ok(Some(payload)) => {
                if payload.text.is_empty() && !self.accept_empty_text {
                    debug!("skipping detection with empty payload text");
                    return;
                }
                if !self.coordinator.try_acquire() {
                    trace!("lost completion race, frame discarded");
                    return;
                }

                // This thread owns the terminal transition now: even a
                // conversion error must surface through the session result.
                let outcome = match self.snapshot(&frame) {
                    Ok(jpeg) => {
                        info!(
                            format = %payload.format,
                            width = frame.width,
                            height = frame.height,
                            "Captured frame for decoded payload"
                        );
                        CaptureResult::Success {
                            text: payload.text,
                            format: payload.format,
                            jpeg,
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Snapshot of accepted frame failed");
                        CaptureResult::Failure {
                            message: format!("snapshot failed: {}", e),
                        }
                    }
                };
                self.coordinator.emit(outcome);
            }
            Ok(None) => {
                trace!("no detection in frame");
            }
            Err(e) => {
                if self.coordinator.try_complete(CaptureResult::Failure {
                    message: e.to_string(),
                }) {
                    warn!(error = %e, "Detector failure terminated session");
                }
            }
        }
    }

    /// Freeze the accepted frame: repack, compress, normalize orientation
    fn snapshot(&self, frame: &FrameBuffer) -> Result<Vec<u8>, CaptureError> {
        let nv21 = yuv::yuv420_to_nv21(frame)?;
        let encoded = jpeg::encode_nv21(&nv21, frame.width, frame.height, self.jpeg_quality)?;
        jpeg::normalize_orientation(encoded, frame.rotation)
    }

    fn report_error(&self, message: String) {
        if self.coordinator.try_complete(CaptureResult::Failure {
            message: message.clone(),
        }) {
            warn!(message = %message, "Scan session failed");
        } else {
            debug!(message = %message, "failure reported after completion, ignored");
        }
    }
}

/// Submit a frame for analysis, spawning onto the blocking pool if available
fn submit(inner: &Arc<SessionInner>, frame: FrameBuffer) -> Option<tokio::task::JoinHandle<()>> {
    if inner.coordinator.is_complete() {
        trace!("frame arrived after completion, discarding");
        return None;
    }

    match &inner.runtime {
        Some(runtime) => {
            let inner = Arc::clone(inner);
            Some(runtime.spawn_blocking(move || inner.analyze(frame)))
        }
        None => {
            inner.analyze(frame);
            None
        }
    }
}

/// One capture attempt, terminating in exactly one [`CaptureResult`]
///
/// Holds the receiving half of the result sink; cloneable [`SessionHandle`]s
/// deliver frames and events from other threads.
pub struct ScanSession {
    inner: Arc<SessionInner>,
    receiver: oneshot::Receiver<CaptureResult>,
}

impl ScanSession {
    /// Get a cloneable handle for frame-delivery and detector threads
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Deliver the latest frame for analysis
    pub fn submit_frame(&self, frame: FrameBuffer) {
        submit(&self.inner, frame);
    }

    /// Report an external detector failure event
    pub fn report_error(&self, message: impl Into<String>) {
        self.inner.report_error(message.into());
    }

    /// Tear the session down; no result will be emitted
    pub fn cancel(&self) {
        if self.inner.coordinator.cancel() {
            debug!("scan session cancelled");
        }
    }

    pub fn is_complete(&self) -> bool {
        self.inner.coordinator.is_complete()
    }

    /// Wait for the terminal result
    ///
    /// A session cancelled before completion resolves to a teardown failure.
    pub async fn wait(self) -> CaptureResult {
        match self.receiver.await {
            Ok(result) => result,
            Err(_) => CaptureResult::Failure {
                message: "scan session cancelled before completion".to_string(),
            },
        }
    }

    /// Drive the session from a frame stream until it terminates
    ///
    /// Frames are analyzed one at a time, so a source that yields its most
    /// recent frame on demand gets keep-only-latest behavior for free. If
    /// the stream ends before any detection, the session fails.
    pub async fn run<S>(self, frames: S) -> CaptureResult
    where
        S: Stream<Item = FrameBuffer>,
    {
        let mut frames = std::pin::pin!(frames);

        while !self.inner.coordinator.is_complete() {
            let Some(frame) = frames.next().await else {
                break;
            };
            if let Some(task) = submit(&self.inner, frame)
                && task.await.is_err()
            {
                warn!("frame analysis task panicked");
            }
        }

        self.inner.coordinator.try_complete(CaptureResult::Failure {
            message: "frame stream ended without a detection".to_string(),
        });
        self.wait().await
    }
}

/// Cloneable submitter side of a [`ScanSession`]
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

impl SessionHandle {
    /// Deliver the latest frame for analysis
    pub fn submit_frame(&self, frame: FrameBuffer) {
        submit(&self.inner, frame);
    }

    /// Report an external detector failure event
    pub fn report_error(&self, message: impl Into<String>) {
        self.inner.report_error(message.into());
    }

    /// Tear the session down; no result will be emitted
    pub fn cancel(&self) {
        if self.inner.coordinator.cancel() {
            debug!("scan session cancelled");
        }
    }

    pub fn is_complete(&self) -> bool {
        self.inner.coordinator.is_complete()
    }
}
