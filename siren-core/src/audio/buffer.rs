//! Lock-free sample buffer between the capture callback and the worker
//!
//! SPSC ring buffer: the cpal callback writes mono samples, the tracking
//! worker drains them one block at a time.

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

/// Ring buffer carrying captured mono samples
pub struct SampleBuffer {
    producer: HeapProducer<f64>,
    consumer: HeapConsumer<f64>,
    capacity: usize,
}

impl SampleBuffer {
    /// Create a buffer holding up to `capacity` samples
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::<f64>::new(capacity);
        let (producer, consumer) = rb.split();

        Self {
            producer,
            consumer,
            capacity,
        }
    }

    /// Split into the writer (capture side) and reader (worker side)
    pub fn split(self) -> (SampleWriter, SampleReader) {
        (
            SampleWriter {
                producer: self.producer,
            },
            SampleReader {
                consumer: self.consumer,
                capacity: self.capacity,
            },
        )
    }
}

/// Capture-side writer
pub struct SampleWriter {
    producer: HeapProducer<f64>,
}

impl SampleWriter {
    /// Append samples, returning how many fit
    ///
    /// On overflow the newest samples are dropped; the capture callback
    /// never blocks.
    pub fn write(&mut self, samples: &[f64]) -> usize {
        self.producer.push_slice(samples)
    }
}

/// Worker-side reader
pub struct SampleReader {
    consumer: HeapConsumer<f64>,
    capacity: usize,
}

impl SampleReader {
    /// Pop up to `buffer.len()` samples, returning how many were read
    pub fn read(&mut self, buffer: &mut [f64]) -> usize {
        self.consumer.pop_slice(buffer)
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
