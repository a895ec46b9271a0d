//! Temperature / humidity channel with hold-last-valid semantics.
//!
//! The DHT22 returns NaN when a read times out or fails its checksum.
//! A failed read keeps the previous estimate so an invalid value never
//! reaches the classifier.

pub struct ClimateChannel {
    /// Reported estimate.
    last: f32,
    /// Last valid sensor reading.
    reading: f32,
}

impl ClimateChannel {
    /// `seed` is reported until the first valid reading arrives.
    pub fn new(seed: f32) -> Self {
        Self {
            last: seed,
            reading: seed,
        }
    }

    /// Accept a raw reading.  Returns `None` (and keeps the previous
    /// estimate) when the reading is not a number.
    pub fn update(&mut self, raw: f32) -> Option<f32> {
        if raw.is_finite() {
            self.last = raw;
            self.reading = raw;
            Some(raw)
        } else {
            None
        }
    }

    /// Pin the estimate to a value produced elsewhere (actuator-driven).
    pub fn hold(&mut self, value: f32) {
        self.last = value;
    }

    /// Report the last valid sensor reading again, dropping any held value.
    pub fn pass_through(&mut self) {
        self.last = self.reading;
    }

    pub fn last(&self) -> f32 {
        self.last
    }
}
