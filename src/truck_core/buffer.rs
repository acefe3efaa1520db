//! Circular Sensor Buffer: a bounded ring of filtered samples, grounded on
//! `original_source/src/embedded/sync/circular_buffer.py`'s `CircularBuffer`
//! (`deque(maxlen=size)`). Unlike `crossbeam_queue::ArrayQueue`, writes past
//! capacity must drop the *oldest* entry rather than reject the new one, so
//! this is hand-rolled over a `VecDeque` behind one mutex, matching the
//! teacher's "one mutex per shared resource, never suspend under it" rule.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::sensor_data::FilteredSample;

pub struct CircularBuffer {
    capacity: usize,
    inner: Mutex<VecDeque<FilteredSample>>,
}

impl CircularBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn write(&self, sample: FilteredSample) {
        let mut buf = self.inner.lock();
        if buf.len() == self.capacity {
            buf.pop_front();
        }
        buf.push_back(sample);
    }

    pub fn read_latest(&self) -> Option<FilteredSample> {
        self.inner.lock().back().cloned()
    }

    pub fn read_last_n(&self, k: usize) -> Vec<FilteredSample> {
        let buf = self.inner.lock();
        let skip = buf.len().saturating_sub(k);
        buf.iter().skip(skip).cloned().collect()
    }

    pub fn read_all(&self) -> Vec<FilteredSample> {
        self.inner.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.lock().len() == self.capacity
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
