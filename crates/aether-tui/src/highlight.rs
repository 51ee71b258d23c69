//! Moving highlight for the result list.
//!
//! The list is rebuilt wholesale whenever a reply arrives. Row geometry is
//! only valid once the rebuilt list has been laid out, so after
//! [`HighlightEngine::rebuild`] the engine is unsettled: highlight requests
//! are parked and nothing is measured until [`HighlightEngine::settle`] is
//! called after the next frame.
//!
//! Repositioning comes in two flavours. Navigation slides the highlight from
//! where it was to the new row. A content change places it without a
//! transition, so the bar never travels across a list it did not come from:
//! the whole window between `rebuild` and `settle` is transition-free, and
//! a rebuild cancels any slide still running.
//!
//! All timing is passed in as [`Instant`]s so the engine can be driven
//! deterministically from tests.

use std::time::{Duration, Instant};

/// Default duration of the navigation slide
pub const DEFAULT_ANIMATION: Duration = Duration::from_millis(120);

/// Vertical position of the highlight bar, in rows from the top of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightGeometry {
    pub offset: usize,
    pub height: u16,
}

#[derive(Debug, Clone, Copy)]
struct Slide {
    from: HighlightGeometry,
    to: HighlightGeometry,
    started: Instant,
}

#[derive(Debug, Clone)]
pub struct HighlightEngine {
    rows: Vec<u16>,
    /// Top of each row, summed from `rows`
    offsets: Vec<usize>,
    settled: bool,
    active: Option<usize>,
    /// Last index a highlight was committed for
    previous: Option<usize>,
    parked: Option<usize>,
    resting: Option<HighlightGeometry>,
    slide: Option<Slide>,
    duration: Duration,
}

impl Default for HighlightEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION)
    }
}

impl HighlightEngine {
    pub fn new(duration: Duration) -> Self {
        Self {
            rows: Vec::new(),
            offsets: Vec::new(),
            settled: true,
            active: None,
            previous: None,
            parked: None,
            resting: None,
            slide: None,
            duration,
        }
    }

    /// Replace the row model. Heights are in terminal rows; a zero height is
    /// treated as one row.
    pub fn rebuild(&mut self, heights: Vec<u16>) {
        self.rows = heights.into_iter().map(|h| h.max(1)).collect();
        self.offsets = self
            .rows
            .iter()
            .scan(0usize, |top, &h| {
                let offset = *top;
                *top += usize::from(h);
                Some(offset)
            })
            .collect();
        self.settled = false;
        self.slide = None;
        self.resting = None;
        self.active = match self.rows.len().checked_sub(1) {
            Some(last) => self.active.map(|i| i.min(last)),
            None => None,
        };
        self.parked = self.active;
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Mark `index` as the active row.
    ///
    /// While unsettled the request is parked and applied without transition
    /// on [`settle`](Self::settle).
    pub fn highlight(&mut self, index: usize, animate: bool, now: Instant) {
        let Some(last) = self.rows.len().checked_sub(1) else {
            self.active = None;
            self.parked = None;
            return;
        };
        let index = index.min(last);
        self.active = Some(index);

        if !self.settled {
            self.parked = Some(index);
            return;
        }
        if animate {
            self.slide_to(index, now);
        } else {
            self.jump_to(index);
        }
    }

    /// Layout for the rebuilt list is done; measure and apply any parked
    /// request.
    pub fn settle(&mut self) {
        if self.settled {
            return;
        }
        self.settled = true;
        if let Some(index) = self.parked.take() {
            self.jump_to(index);
        }
    }

    fn measure(&self, index: usize) -> HighlightGeometry {
        HighlightGeometry {
            offset: self.offsets[index],
            height: self.rows[index],
        }
    }

    fn slide_to(&mut self, index: usize, now: Instant) {
        if self.previous == Some(index) {
            return;
        }
        let target = self.measure(index);
        let from = self.geometry(now);
        self.previous = Some(index);

        match from {
            Some(from) if from != target => {
                self.slide = Some(Slide {
                    from,
                    to: target,
                    started: now,
                });
            }
            _ => self.slide = None,
        }
        self.resting = Some(target);
    }

    fn jump_to(&mut self, index: usize) {
        self.slide = None;
        self.resting = Some(self.measure(index));
        self.previous = Some(index);
    }

    /// Current bar position, interpolated while a slide is running.
    ///
    /// `None` until the rebuilt list has settled, or when there are no rows.
    pub fn geometry(&self, now: Instant) -> Option<HighlightGeometry> {
        if !self.settled {
            return None;
        }
        let resting = self.resting?;
        let Some(slide) = self.slide else {
            return Some(resting);
        };

        let elapsed = now.saturating_duration_since(slide.started);
        if elapsed >= self.duration || self.duration.is_zero() {
            return Some(resting);
        }

        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let eased = 1.0 - (1.0 - t).powi(3);
        Some(HighlightGeometry {
            offset: lerp_offset(slide.from.offset, slide.to.offset, eased),
            height: lerp_height(slide.from.height, slide.to.height, eased),
        })
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.slide
            .is_some_and(|slide| now.saturating_duration_since(slide.started) < self.duration)
    }
}

// Both ends are valid offsets and `t` is in [0, 1], so the result stays
// between them.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn lerp_offset(from: usize, to: usize, t: f64) -> usize {
    let value = from as f64 + (to as f64 - from as f64) * t;
    value.round().max(0.0) as usize
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_height(from: u16, to: u16, t: f64) -> u16 {
    let value = f64::from(from) + (f64::from(to) - f64::from(from)) * t;
    value.round().clamp(0.0, f64::from(u16::MAX)) as u16
}
