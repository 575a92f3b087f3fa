use crate::constants::{DEFAULT_DISPLAY_MAX_CM, DEFAULT_DISPLAY_MIN_CM};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use ultrasonic_data::{SeriesPoint, DEFAULT_SERIES_CAPACITY};

/// Fixed-capacity FIFO of the most recent readings, for real-time display.
#[derive(Clone, Debug)]
pub struct SeriesBuffer {
    points: VecDeque<SeriesPoint>,
    capacity: usize,
    next_sequence: u64,
    paused: bool,
}

/// Summary of the points currently in the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Value axis bounds handed to the display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayRange {
    pub min: f64,
    pub max: f64,
}

impl Default for DisplayRange {
    fn default() -> Self {
        DisplayRange {
            min: DEFAULT_DISPLAY_MIN_CM,
            max: DEFAULT_DISPLAY_MAX_CM,
        }
    }
}

impl DisplayRange {
    pub fn new(min: f64, max: f64) -> DisplayRange {
        DisplayRange { min, max }
    }
}

impl Default for SeriesBuffer {
    fn default() -> Self {
        SeriesBuffer::new()
    }
}

impl SeriesBuffer {
    pub fn new() -> SeriesBuffer {
        SeriesBuffer::with_capacity(DEFAULT_SERIES_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> SeriesBuffer {
        SeriesBuffer {
            points: VecDeque::with_capacity(capacity),
            capacity,
            next_sequence: 0,
            paused: false,
        }
    }

    /// Appends `value` under the next sequence number and evicts the oldest
    /// points beyond capacity. Does nothing while paused.
    pub fn append(&mut self, value: f64) {
        if self.paused {
            return;
        }
        self.points.push_back(SeriesPoint {
            sequence: self.next_sequence,
            value,
        });
        self.next_sequence += 1;
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Takes effect on the next append; current contents are left alone.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Empties the window and restarts sequence numbers at zero.
    pub fn clear(&mut self) {
        self.points.clear();
        self.next_sequence = 0;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Points from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.points.back()
    }

    pub fn to_vec(&self) -> Vec<SeriesPoint> {
        self.points.iter().copied().collect()
    }

    pub fn stats(&self) -> Option<SeriesStats> {
        if self.points.is_empty() {
            return None;
        }
        let (min, max, sum) = self.points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.),
            |(min, max, sum), p| (min.min(p.value), max.max(p.value), sum + p.value),
        );
        let count = self.points.len();
        Some(SeriesStats {
            count,
            min,
            max,
            mean: sum / count as f64,
        })
    }

    /// Sequence axis the display should show: `[0, capacity]` until the
    /// window has filled, then the last `capacity` sequence numbers.
    pub fn sequence_window(&self) -> (u64, u64) {
        let capacity = self.capacity as u64;
        if self.next_sequence > capacity {
            (self.next_sequence - capacity, self.next_sequence)
        } else {
            (0, capacity)
        }
    }
}

/// A [`SeriesBuffer`] shared between one writer and any number of readers.
///
/// Every read happens under the lock, so a reader never observes a window
/// mid-eviction.
#[derive(Clone, Debug, Default)]
pub struct SharedSeries {
    inner: Arc<RwLock<SeriesBuffer>>,
}

impl SharedSeries {
    pub fn new(buffer: SeriesBuffer) -> SharedSeries {
        SharedSeries {
            inner: Arc::new(RwLock::new(buffer)),
        }
    }

    pub fn with_capacity(capacity: usize) -> SharedSeries {
        SharedSeries::new(SeriesBuffer::with_capacity(capacity))
    }

    pub fn append(&self, value: f64) {
        self.inner.write().append(value);
    }

    pub fn set_capacity(&self, capacity: usize) {
        self.inner.write().set_capacity(capacity);
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn set_paused(&self, paused: bool) {
        self.inner.write().set_paused(paused);
    }

    /// Copy of the window, oldest first.
    pub fn snapshot(&self) -> Vec<SeriesPoint> {
        self.inner.read().to_vec()
    }

    /// Runs `f` against a consistent view of the buffer.
    pub fn read<R>(&self, f: impl FnOnce(&SeriesBuffer) -> R) -> R {
        f(&self.inner.read())
    }
}
