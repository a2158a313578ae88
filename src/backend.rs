use std::sync::{Arc, Mutex};

use image::{DynamicImage, RgbaImage};

use crate::detection::DetectionPipeline;
use crate::error::DetectError;
use crate::models::{Corners, ScoredCorners};
use crate::rectify;

/// Lifecycle of the host's native vision backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

type ReadyCallback = Box<dyn FnOnce(bool) + Send>;

struct Inner {
    state: BackendState,
    waiters: Vec<ReadyCallback>,
}

/// Readiness gate for the host's vision backend.
///
/// Hosts that load a native library asynchronously drive the transitions
/// `Uninitialized -> Initializing -> Ready | Failed`; detection entry points
/// call [`Backend::ensure_ready`] and fail fast with `NotReady` instead of
/// crashing mid-pipeline. Callbacks registered while initialization is in
/// flight are queued and flushed exactly once on the terminal transition.
pub struct Backend {
    inner: Mutex<Inner>,
}

impl Backend {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BackendState::Uninitialized,
                waiters: Vec::new(),
            }),
        }
    }

    /// A backend that is ready from the start, for hosts with no native
    /// library to wait on.
    pub fn ready() -> Self {
        let backend = Self::new();
        backend.begin_initialization();
        backend.finish_initialization(true);
        backend
    }

    pub fn state(&self) -> BackendState {
        self.inner.lock().expect("backend mutex poisoned").state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == BackendState::Ready
    }

    /// Move from `Uninitialized` to `Initializing`. Returns false when
    /// initialization already started or finished, so concurrent hosts
    /// trigger the underlying load only once.
    pub fn begin_initialization(&self) -> bool {
        let mut inner = self.inner.lock().expect("backend mutex poisoned");
        if inner.state != BackendState::Uninitialized {
            return false;
        }
        inner.state = BackendState::Initializing;
        true
    }

    /// Record the outcome of initialization and flush every queued callback.
    /// Callbacks run outside the lock.
    pub fn finish_initialization(&self, success: bool) {
        let waiters = {
            let mut inner = self.inner.lock().expect("backend mutex poisoned");
            inner.state = if success {
                BackendState::Ready
            } else {
                BackendState::Failed
            };
            std::mem::take(&mut inner.waiters)
        };
        for waiter in waiters {
            waiter(success);
        }
    }

    /// Run `callback` with the initialization outcome: immediately if the
    /// backend already reached a terminal state, otherwise once it does.
    pub fn on_ready(&self, callback: impl FnOnce(bool) + Send + 'static) {
        let outcome = {
            let mut inner = self.inner.lock().expect("backend mutex poisoned");
            match inner.state {
                BackendState::Ready => Some(true),
                BackendState::Failed => Some(false),
                BackendState::Uninitialized | BackendState::Initializing => {
                    inner.waiters.push(Box::new(callback));
                    return;
                }
            }
        };
        if let Some(success) = outcome {
            callback(success);
        }
    }

    pub fn ensure_ready(&self) -> Result<(), DetectError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(DetectError::NotReady)
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}

/// Host-facing facade: a detection pipeline behind the backend readiness
/// gate. This is what a dispatch layer routes `detectRectangle`,
/// `detectAllRectangles` and crop calls through.
pub struct Detector {
    pipeline: DetectionPipeline,
    backend: Arc<Backend>,
}

impl Detector {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self {
            pipeline: DetectionPipeline::new(),
            backend,
        }
    }

    pub fn with_pipeline(backend: Arc<Backend>, pipeline: DetectionPipeline) -> Self {
        Self { pipeline, backend }
    }

    pub fn detect_rectangle(&self, img: &DynamicImage) -> Result<Option<Corners>, DetectError> {
        self.backend.ensure_ready()?;
        self.pipeline.detect(img)
    }

    pub fn detect_all_rectangles(
        &self,
        img: &DynamicImage,
    ) -> Result<Vec<ScoredCorners>, DetectError> {
        self.backend.ensure_ready()?;
        self.pipeline.detect_all(img)
    }

    pub fn rectify(
        &self,
        img: &DynamicImage,
        corners: &Corners,
    ) -> Result<RgbaImage, DetectError> {
        self.backend.ensure_ready()?;
        rectify::rectify(img, corners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn transitions_follow_the_state_machine() {
        let backend = Backend::new();
        assert_eq!(backend.state(), BackendState::Uninitialized);
        assert!(backend.begin_initialization());
        assert_eq!(backend.state(), BackendState::Initializing);
        // A second begin is a no-op.
        assert!(!backend.begin_initialization());
        backend.finish_initialization(true);
        assert_eq!(backend.state(), BackendState::Ready);
        assert!(backend.ensure_ready().is_ok());
    }

    #[test]
    fn failed_initialization_is_terminal_and_not_ready() {
        let backend = Backend::new();
        backend.begin_initialization();
        backend.finish_initialization(false);
        assert_eq!(backend.state(), BackendState::Failed);
        assert!(matches!(backend.ensure_ready(), Err(DetectError::NotReady)));
    }

    #[test]
    fn queued_callbacks_flush_on_transition() {
        let backend = Backend::new();
        let calls = Arc::new(AtomicUsize::new(0));

        backend.begin_initialization();
        for _ in 0..3 {
            let calls = calls.clone();
            backend.on_ready(move |success| {
                assert!(success);
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        backend.finish_initialization(true);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        // Late subscribers run immediately.
        let calls2 = calls.clone();
        backend.on_ready(move |_| {
            calls2.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn detector_fails_fast_before_ready() {
        let backend = Arc::new(Backend::new());
        let detector = Detector::new(backend.clone());
        let img = DynamicImage::new_rgba8(10, 10);
        assert!(matches!(
            detector.detect_rectangle(&img),
            Err(DetectError::NotReady)
        ));

        backend.begin_initialization();
        backend.finish_initialization(true);
        assert!(detector.detect_rectangle(&img).is_ok());
    }
}
