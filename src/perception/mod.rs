//! Hand perception.
//!
//! A [`HandSource`] yields at most one [`Detection`] per poll. [`Perception`]
//! owns the source and the optional helper process, and turns every failure
//! into a logged downgrade to pointer-only control.
//!
//! Lifecycle: [`Perception::init`] once at startup, [`Perception::shutdown`]
//! once at exit (also run on drop). After a failure the adapter stays
//! unavailable for the rest of the session.

pub mod receiver;
pub mod subprocess;

use crate::config::PerceptionConfig;
use crate::error::PerceptionError;
use crate::hand::HandFrame;

pub use receiver::{LandmarkPacket, UdpLandmarkReceiver};
pub use subprocess::TrackerProcess;

/// Result of one detector run.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Hand(HandFrame),
    /// The detector ran and found no hand.
    NoHand,
}

/// Anything that produces hand detections.
pub trait HandSource: Send {
    /// Newest detection since the last poll, or `None` when nothing new
    /// arrived. Must not block.
    fn poll(&mut self) -> Result<Option<Detection>, PerceptionError>;

    /// Short label for logs.
    fn name(&self) -> &str {
        "hand source"
    }

    /// Release resources. Called once by [`Perception::shutdown`].
    fn shutdown(&mut self) {}
}

/// Owned perception resources, injected into the app.
pub struct Perception {
    source: Option<Box<dyn HandSource>>,
    helper: Option<TrackerProcess>,
    shut_down: bool,
}

impl Perception {
    /// No tracking; the pointer drives everything.
    pub fn disabled() -> Self {
        Self {
            source: None,
            helper: None,
            shut_down: false,
        }
    }

    /// Wrap an already constructed source.
    pub fn with_source(source: Box<dyn HandSource>) -> Self {
        Self {
            source: Some(source),
            helper: None,
            shut_down: false,
        }
    }

    /// Set up from configuration. Never fails: problems are logged and leave
    /// the adapter disabled.
    pub fn init(config: &PerceptionConfig) -> Self {
        if !config.enabled {
            tracing::info!("Hand tracking disabled, using pointer control");
            return Self::disabled();
        }

        let mut helper = if config.auto_launch {
            match TrackerProcess::launch(config) {
                Ok(process) => Some(process),
                Err(e) => {
                    tracing::warn!("{}. Falling back to pointer control", e);
                    return Self::disabled();
                }
            }
        } else {
            None
        };

        match UdpLandmarkReceiver::bind(&config.bind_addr()) {
            Ok(receiver) => Self {
                source: Some(Box::new(receiver)),
                helper,
                shut_down: false,
            },
            Err(e) => {
                tracing::warn!("{}. Falling back to pointer control", e);
                if let Some(process) = helper.as_mut() {
                    process.stop();
                }
                Self::disabled()
            }
        }
    }

    /// Whether detections can still arrive.
    pub fn is_available(&self) -> bool {
        self.source.is_some()
    }

    /// Poll the source once.
    ///
    /// Bad packets are dropped. Losing the helper process disables tracking
    /// and reports one final `NoHand` so the scene returns to rest.
    pub fn poll(&mut self) -> Option<Detection> {
        let source = self.source.as_mut()?;

        if let Some(helper) = self.helper.as_mut() {
            if !helper.is_running() {
                tracing::warn!("Hand tracker stopped (camera unavailable?). Using pointer control");
                self.helper = None;
                self.release_source();
                return Some(Detection::NoHand);
            }
        }

        match source.poll() {
            Ok(detection) => {
                if let Some(Detection::Hand(frame)) = &detection {
                    tracing::trace!(timestamp_ms = frame.timestamp_ms, "Hand detection");
                }
                detection
            }
            Err(e @ (PerceptionError::Parse(_) | PerceptionError::LandmarkCount(_))) => {
                tracing::debug!("Ignoring landmark packet: {}", e);
                None
            }
            Err(e) => {
                tracing::warn!("{} from {}. Using pointer control", e, source.name());
                self.release_source();
                Some(Detection::NoHand)
            }
        }
    }

    fn release_source(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.shutdown();
        }
    }

    /// Tear everything down. Only the first call has an effect.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.release_source();
        if let Some(mut helper) = self.helper.take() {
            helper.stop();
        }
        tracing::info!("Perception shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Drop for Perception {
    fn drop(&mut self) {
        self.shutdown();
    }
}
