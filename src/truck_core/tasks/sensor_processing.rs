//! Sensor Processing Task, §4.6. Period 100 ms. Sole producer of filtered
//! samples: reads the sensor source, applies one independent
//! moving-average filter per numeric channel, passes fault booleans
//! through, timestamps, and writes to the circular buffer.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::truck_core::buffer::CircularBuffer;
use crate::truck_core::filter::MovingAverageFilter;
use crate::truck_core::sensor_data::{FilteredSample, SensorSource};
use crate::util::unix_time_secs;

use super::run_periodic;

pub struct SensorProcessingTask {
    source: Arc<dyn SensorSource>,
    buffer: Arc<CircularBuffer>,
    x: MovingAverageFilter,
    y: MovingAverageFilter,
    theta: MovingAverageFilter,
    velocity: MovingAverageFilter,
    temperature: MovingAverageFilter,
}

impl SensorProcessingTask {
    pub fn new(source: Arc<dyn SensorSource>, buffer: Arc<CircularBuffer>, filter_order: usize) -> Self {
        Self {
            source,
            buffer,
            x: MovingAverageFilter::new(filter_order),
            y: MovingAverageFilter::new(filter_order),
            theta: MovingAverageFilter::new(filter_order),
            velocity: MovingAverageFilter::new(filter_order),
            temperature: MovingAverageFilter::new(filter_order),
        }
    }

    fn tick(&mut self) {
        let raw = self.source.read();
        let sample = FilteredSample {
            x: self.x.filter(raw.x),
            y: self.y.filter(raw.y),
            theta: self.theta.filter(raw.theta),
            velocity: self.velocity.filter(raw.velocity),
            temperature: self.temperature.filter(raw.temperature),
            electrical_fault: raw.electrical_fault,
            hydraulic_fault: raw.hydraulic_fault,
            timestamp: unix_time_secs(),
        };
        debug!(
            "sensor-processing tick: x={:.3} y={:.3} theta={:.3} v={:.3} temp={:.2}",
            sample.x, sample.y, sample.theta, sample.velocity, sample.temperature
        );
        self.buffer.write(sample);
    }

    pub fn run(mut self, stop: &AtomicBool, period: Duration) {
        run_periodic("sensor-processing", period, stop, || self.tick());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truck_core::sensor_data::SensorSampleRaw;
    use std::sync::Mutex;

    struct ConstSource(Mutex<f64>);
    impl SensorSource for ConstSource {
        fn read(&self) -> SensorSampleRaw {
            let v = *self.0.lock().unwrap();
            SensorSampleRaw {
                x: v,
                y: v,
                theta: 0.0,
                velocity: v,
                temperature: 20.0,
                electrical_fault: false,
                hydraulic_fault: false,
                timestamp: 0.0,
            }
        }
    }

    #[test]
    fn filters_each_numeric_channel_independently() {
        let source = Arc::new(ConstSource(Mutex::new(3.0)));
        let buffer = Arc::new(CircularBuffer::new(10));
        let mut task = SensorProcessingTask::new(source, buffer.clone(), 5);
        for _ in 0..3 {
            task.tick();
        }
        let latest = buffer.read_latest().unwrap();
        assert_eq!(latest.x, 3.0);
        assert_eq!(latest.velocity, 3.0);
        assert!(!latest.electrical_fault);
    }
}
