//! Frame differencing behind the motion gate.

use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::Serialize;

use crate::settings::CaptureSettings;

/// One RGB sample of the live feed.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            captured_at: Utc::now(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSample {
    /// Mean summed |ΔR|+|ΔG|+|ΔB| over the sampled pixels.
    pub average_channel_delta: f64,
    /// Fraction of sampled pixels whose summed delta exceeded the per-pixel threshold.
    pub changed_pixel_ratio: f64,
}

/// Dual-threshold gate. Both comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionGate {
    pub pixel_stride: usize,
    pub pixel_change_threshold: u32,
    pub average_delta_threshold: f64,
    pub changed_ratio_threshold: f64,
}

impl Default for MotionGate {
    fn default() -> Self {
        Self::from(&CaptureSettings::default())
    }
}

impl From<&CaptureSettings> for MotionGate {
    fn from(settings: &CaptureSettings) -> Self {
        Self {
            pixel_stride: settings.pixel_stride.max(1),
            pixel_change_threshold: settings.pixel_change_threshold,
            average_delta_threshold: settings.average_delta_threshold,
            changed_ratio_threshold: settings.changed_ratio_threshold,
        }
    }
}

impl MotionGate {
    pub fn is_motion(&self, sample: &MotionSample) -> bool {
        sample.average_channel_delta > self.average_delta_threshold
            && sample.changed_pixel_ratio > self.changed_ratio_threshold
    }

    /// Compares every `pixel_stride`-th pixel of two equally sized frames.
    /// Returns `None` when the dimensions differ or there is nothing to sample.
    pub fn sample(&self, previous: &RgbImage, current: &RgbImage) -> Option<MotionSample> {
        if previous.dimensions() != current.dimensions() {
            return None;
        }

        let prev = previous.as_raw();
        let curr = current.as_raw();
        let pixel_count = curr.len() / 3;
        let stride = self.pixel_stride.max(1);

        let mut sampled = 0usize;
        let mut changed = 0usize;
        let mut total_diff = 0u64;

        for pixel in (0..pixel_count).step_by(stride) {
            let i = pixel * 3;
            let diff = channel_delta(prev[i], curr[i])
                + channel_delta(prev[i + 1], curr[i + 1])
                + channel_delta(prev[i + 2], curr[i + 2]);

            total_diff += u64::from(diff);
            if diff > self.pixel_change_threshold {
                changed += 1;
            }
            sampled += 1;
        }

        if sampled == 0 {
            return None;
        }

        Some(MotionSample {
            average_channel_delta: total_diff as f64 / sampled as f64,
            changed_pixel_ratio: changed as f64 / sampled as f64,
        })
    }
}

fn channel_delta(a: u8, b: u8) -> u32 {
    u32::from(a.abs_diff(b))
}

/// Holds the previous frame and compares each new one against it.
pub struct MotionDetector {
    gate: MotionGate,
    previous: Option<Frame>,
}

impl MotionDetector {
    pub fn new(gate: MotionGate) -> Self {
        Self {
            gate,
            previous: None,
        }
    }

    pub fn gate(&self) -> &MotionGate {
        &self.gate
    }

    /// Samples `frame` against the stored frame and then stores `frame`.
    /// The first frame (or one with new dimensions) yields `None`.
    pub fn observe(&mut self, frame: &Frame) -> Option<MotionSample> {
        let sample = self
            .previous
            .as_ref()
            .and_then(|previous| self.gate.sample(&previous.image, &frame.image));
        self.previous = Some(frame.clone());
        sample
    }

    pub fn has_reference(&self) -> bool {
        self.previous.is_some()
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
