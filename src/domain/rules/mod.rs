// Domain rules - Interval algebra, segment planning and scaling policy

use std::cmp::Ordering;

use crate::domain::errors::DomainError;
use crate::domain::model::*;

/// Snap a timestamp to the nearest frame boundary
pub fn snap_to_frame(time: f64, frame_rate: f64) -> f64 {
    (time * frame_rate).round() / frame_rate
}

/// Turns a trim range plus interior cuts into the ordered list of
/// intervals that survive.
pub struct IntervalCalculator;

impl IntervalCalculator {
    /// Compute keep segments for one source.
    ///
    /// Trim bounds and cut endpoints are snapped to frame ticks when
    /// `frame_rate` is positive. An empty result means every frame was
    /// removed; callers decide how to report that.
    pub fn compute(
        duration: f64,
        trim_start: f64,
        trim_end: Option<f64>,
        cuts: &[CutRequest],
        frame_rate: Option<f64>,
    ) -> Vec<KeepSegment> {
        let fps = frame_rate.filter(|f| f.is_finite() && *f > 0.0);
        let bound = |t: f64| Self::bound(t, duration, fps);

        let start = bound(trim_start);
        let end = bound(trim_end.unwrap_or(duration));
        if start >= end {
            return Vec::new();
        }

        let mut ordered: Vec<CutRequest> = cuts.to_vec();
        ordered.sort_by(|a, b| match a.start.total_cmp(&b.start) {
            Ordering::Equal => a.end.total_cmp(&b.end),
            other => other,
        });

        let mut keep = vec![(start, end)];
        for cut in &ordered {
            let (cut_start, cut_end) = (bound(cut.start), bound(cut.end));
            if cut_start >= cut_end {
                continue;
            }
            keep = keep
                .into_iter()
                .flat_map(|range| Self::subtract(range, cut_start, cut_end))
                .collect();
        }

        keep.into_iter()
            .filter_map(|(s, e)| TimeInterval::new(s, e).ok())
            .collect()
    }

    /// Remove `[cut_start, cut_end)` from one range
    fn subtract((start, end): (f64, f64), cut_start: f64, cut_end: f64) -> Vec<(f64, f64)> {
        if cut_end <= start || cut_start >= end {
            vec![(start, end)]
        } else if cut_start <= start && cut_end < end {
            vec![(cut_end, end)]
        } else if cut_start > start && cut_end >= end {
            vec![(start, cut_start)]
        } else if cut_start > start && cut_end < end {
            vec![(start, cut_start), (cut_end, end)]
        } else {
            Vec::new()
        }
    }

    /// Snap to a frame tick and keep the result inside `[0, duration]`.
    /// A tick past the end falls back to the last tick inside it.
    fn bound(time: f64, duration: f64, fps: Option<f64>) -> f64 {
        match fps {
            Some(fps) => {
                let snapped = snap_to_frame(time, fps);
                if snapped > duration {
                    ((duration * fps).floor() / fps).min(duration)
                } else {
                    snapped.max(0.0)
                }
            }
            None => time.clamp(0.0, duration),
        }
    }
}

/// Upper bound on the segments planned for one source
pub const MAX_SEGMENTS: usize = 1000;

/// Divides a source into fixed segments for splitting
pub struct SegmentPlanner;

impl SegmentPlanner {
    pub fn plan(
        duration: f64,
        method: SplitMethod,
        value: f64,
    ) -> Result<Vec<TimeInterval>, DomainError> {
        if !(value.is_finite() && value > 0.0) {
            return Err(DomainError::BadArgs(format!(
                "split_value must be positive, got {}",
                value
            )));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(DomainError::BadArgs(format!(
                "Cannot split a source of duration {}",
                duration
            )));
        }

        let (count, length) = match method {
            SplitMethod::Duration => {
                let count = (duration / value).ceil();
                if count > MAX_SEGMENTS as f64 {
                    return Err(DomainError::BadArgs(format!(
                        "split_value {} would produce {} segments, more than {}",
                        value, count, MAX_SEGMENTS
                    )));
                }
                (count as usize, value)
            }
            SplitMethod::Segments => {
                let count = value as usize;
                if count == 0 || value > MAX_SEGMENTS as f64 {
                    return Err(DomainError::BadArgs(format!(
                        "Segment count must be between 1 and {}, got {}",
                        MAX_SEGMENTS, value
                    )));
                }
                (count, duration / count as f64)
            }
        };

        let segments = (0..count)
            .filter_map(|i| {
                let start = i as f64 * length;
                let end = if i + 1 == count {
                    duration
                } else {
                    (start + length).min(duration)
                };
                TimeInterval::new(start, end).ok()
            })
            .collect();

        Ok(segments)
    }
}

/// Output dimensions policy
pub struct ScaleRule;

impl ScaleRule {
    /// Build the scale filter for a resolution policy and source size
    pub fn filter(resolution: &Resolution, width: u32, height: u32) -> String {
        match resolution {
            Resolution::Original => format!("scale={}:{}", width, height),
            Resolution::Scale { scale_percent } => {
                let factor = scale_percent / 100.0;
                let w = Self::round_up_even((width as f64 * factor) as u32);
                let h = Self::round_up_even((height as f64 * factor) as u32);
                format!("scale={}:{}", w, h)
            }
            Resolution::Width { width } => format!("scale={}:-2", width),
            Resolution::Custom { width, height } => format!("scale={}:{}", width, height),
        }
    }

    fn round_up_even(value: u32) -> u32 {
        if value % 2 == 0 {
            value
        } else {
            value.checked_add(1).unwrap_or(value - 1)
        }
    }
}
