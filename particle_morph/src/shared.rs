//! The cell the gesture loop writes and the render loop reads.
//!
//! Exactly one writer (the tracker thread) stores the latest smoothed
//! factor; any number of readers load it whenever they like.  The two
//! fields are independent atomics, so a reader can observe a factor from
//! one sample next to the `detected` flag of the neighbouring sample.
//! That race is accepted: both values are re-written every sample and the
//! morph engine's own smoothing absorbs a one-frame mismatch.  Nothing here
//! ever blocks.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::gesture::{Interaction, NEUTRAL_FACTOR};

#[derive(Debug)]
pub struct InteractionCell {
    factor_bits: AtomicU32,
    detected:    AtomicBool,
}

impl InteractionCell {
    /// A cell holding the neutral factor with no hands detected.
    pub fn new() -> Self {
        InteractionCell {
            factor_bits: AtomicU32::new(NEUTRAL_FACTOR.to_bits()),
            detected:    AtomicBool::new(false),
        }
    }

    /// Latest write wins.
    pub fn store(&self, interaction: Interaction) {
        self.factor_bits.store(interaction.factor.to_bits(), Ordering::Relaxed);
        self.detected.store(interaction.detected, Ordering::Relaxed);
    }

    pub fn load(&self) -> Interaction {
        Interaction {
            factor:   f32::from_bits(self.factor_bits.load(Ordering::Relaxed)),
            detected: self.detected.load(Ordering::Relaxed),
        }
    }

    pub fn factor(&self) -> f32 { self.load().factor }

    /// Back to neutral, e.g. after the detector goes away.
    pub fn reset(&self) {
        self.store(Interaction::NEUTRAL);
    }
}

impl Default for InteractionCell {
    fn default() -> Self { InteractionCell::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_neutral() {
        let cell = InteractionCell::new();
        assert_eq!(cell.load(), Interaction::NEUTRAL);
    }

    #[test]
    fn latest_write_wins() {
        let cell = InteractionCell::new();
        cell.store(Interaction { factor: 0.1, detected: true });
        cell.store(Interaction { factor: 0.9, detected: true });
        assert_eq!(cell.load(), Interaction { factor: 0.9, detected: true });
        cell.reset();
        assert_eq!(cell.load(), Interaction::NEUTRAL);
    }

    #[test]
    fn readers_see_final_write_from_another_thread() {
        let cell = Arc::new(InteractionCell::new());
        let writer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for i in 0..=1000 {
                    cell.store(Interaction { factor: i as f32 / 1000.0, detected: true });
                }
            })
        };
        // Concurrent reads only ever see values that were written.
        for _ in 0..1000 {
            let f = cell.factor();
            assert!((0.0..=1.0).contains(&f));
        }
        writer.join().ok();
        assert_eq!(cell.factor(), 1.0);
    }
}
