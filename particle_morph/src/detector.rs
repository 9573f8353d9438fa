//! The hand-detector service seam.
//!
//! A detector is an explicit service object that owns whatever device it
//! reads from (camera, tracking controller, simulated input).  It has a
//! three-step lifecycle driven by the tracker thread:
//!
//! 1. [`init`](HandDetector::init) once — acquire the device, load models.
//!    May fail; the failure is reported and the tracker stops sampling.
//! 2. [`detect`](HandDetector::detect) repeatedly — block until the next
//!    frame (or a short timeout) and return what was seen.
//! 3. [`dispose`](HandDetector::dispose) once — release the device.  Always
//!    called, even after a failed `init`.

use crate::error::DetectorError;
use crate::gesture::GestureSample;

/// Outcome of one [`HandDetector::detect`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum Detection {
    /// A frame was processed.  An empty sample means no hands were visible.
    Sample(GestureSample),
    /// No new frame arrived within the detector's wait.
    NoFrame,
    /// The device went away; the tracker stops.
    Lost(DetectorError),
}

pub trait HandDetector: Send + 'static {
    /// Short name for log lines.
    fn name(&self) -> &str;

    fn init(&mut self) -> Result<(), DetectorError>;

    /// `timestamp_ms` is milliseconds since the tracker started and is
    /// monotonic across calls.
    fn detect(&mut self, timestamp_ms: u64) -> Detection;

    fn dispose(&mut self);
}

impl<D: HandDetector + ?Sized> HandDetector for Box<D> {
    fn name(&self) -> &str { (**self).name() }
    fn init(&mut self) -> Result<(), DetectorError> { (**self).init() }
    fn detect(&mut self, timestamp_ms: u64) -> Detection { (**self).detect(timestamp_ms) }
    fn dispose(&mut self) { (**self).dispose() }
}

/// A detector whose device never comes up.  Useful when the user opts out
/// of hand tracking: the cloud stays at neutral interaction.
#[derive(Debug, Clone)]
pub struct UnavailableDetector {
    reason: String,
}

impl UnavailableDetector {
    pub fn new(reason: impl Into<String>) -> Self {
        UnavailableDetector { reason: reason.into() }
    }
}

impl HandDetector for UnavailableDetector {
    fn name(&self) -> &str { "unavailable" }

    fn init(&mut self) -> Result<(), DetectorError> {
        Err(DetectorError::CameraUnavailable(self.reason.clone()))
    }

    fn detect(&mut self, _timestamp_ms: u64) -> Detection {
        Detection::Lost(DetectorError::CameraUnavailable(self.reason.clone()))
    }

    fn dispose(&mut self) {}
}
