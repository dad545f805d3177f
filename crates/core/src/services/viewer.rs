//! Gallery viewer state machine.
//!
//! Pure state the presentation host drives: the slideshow owns the
//! current index, circular navigation, and the auto-advance deadline;
//! the swipe tracker turns touch positions into navigation actions.

use std::time::{Duration, Instant};

use vitrine_store::GalleryEntry;

/// Navigation produced by a completed swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAction {
    /// Navigate to the previous entry.
    Previous,
    /// Navigate to the next entry.
    Next,
}

/// Slideshow over the ordered entry list.
#[derive(Debug, Clone)]
pub struct Slideshow {
    entries: Vec<GalleryEntry>,
    index: usize,
    interval: Duration,
    next_advance: Instant,
}

impl Slideshow {
    /// Create a slideshow starting at the first entry.
    #[must_use]
    pub fn new(entries: Vec<GalleryEntry>, interval: Duration, now: Instant) -> Self {
        Self {
            entries,
            index: 0,
            interval,
            next_advance: now + interval,
        }
    }

    /// Currently displayed entry; `None` is the "no content" state.
    #[must_use]
    pub fn current(&self) -> Option<&GalleryEntry> {
        self.entries.get(self.index)
    }

    /// Index of the current entry.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the slideshow has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the entries after a refetch, clamping the index into
    /// range. The auto-advance deadline restarts.
    pub fn set_entries(&mut self, entries: Vec<GalleryEntry>, now: Instant) {
        self.entries = entries;
        if self.index >= self.entries.len() {
            self.index = 0;
        }
        self.restart(now);
    }

    /// Advance to the next entry, wrapping past the end.
    pub fn next(&mut self, now: Instant) {
        if self.entries.is_empty() {
            return;
        }
        self.index = if self.index + 1 == self.entries.len() {
            0
        } else {
            self.index + 1
        };
        self.restart(now);
    }

    /// Go back one entry, wrapping past the start.
    pub fn previous(&mut self, now: Instant) {
        if self.entries.is_empty() {
            return;
        }
        self.index = if self.index == 0 {
            self.entries.len() - 1
        } else {
            self.index - 1
        };
        self.restart(now);
    }

    /// Jump directly to `index`. Out-of-range selections are ignored.
    pub fn select(&mut self, index: usize, now: Instant) {
        if index < self.entries.len() {
            self.index = index;
            self.restart(now);
        }
    }

    /// Advance automatically once the interval has elapsed. Returns
    /// whether the slideshow advanced. The deadline restarts on every
    /// index change, whatever caused it.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.entries.is_empty() || now < self.next_advance {
            return false;
        }
        self.next(now);
        true
    }

    /// Apply a completed swipe.
    pub fn apply_swipe(&mut self, action: SwipeAction, now: Instant) {
        match action {
            SwipeAction::Previous => self.previous(now),
            SwipeAction::Next => self.next(now),
        }
    }

    fn restart(&mut self, now: Instant) {
        self.next_advance = now + self.interval;
    }
}

/// Accumulates horizontal touch positions for swipe detection.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f32,
    start: Option<f32>,
    last: Option<f32>,
}

impl SwipeTracker {
    /// Create a tracker with the minimum swipe distance in pixels.
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start: None,
            last: None,
        }
    }

    /// A touch began at horizontal position `x`.
    pub fn touch_start(&mut self, x: f32) {
        self.start = Some(x);
        self.last = None;
    }

    /// The touch moved to horizontal position `x`.
    pub fn touch_move(&mut self, x: f32) {
        self.last = Some(x);
    }

    /// The touch ended. A displacement below the threshold produces no
    /// navigation; beyond it, the direction decides previous or next.
    pub fn touch_end(&mut self) -> Option<SwipeAction> {
        let start = self.start.take()?;
        let end = self.last.take()?;

        let distance = start - end;
        if distance > self.threshold {
            Some(SwipeAction::Next)
        } else if distance < -self.threshold {
            Some(SwipeAction::Previous)
        } else {
            None
        }
    }
}
