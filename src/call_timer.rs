//! Times calls that take a record by value against calls that take it by
//! reference, for a large and a tiny record.

use std::fmt;
use std::hint::black_box;
use std::io::Write;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::TimerError;

/// Calls per batch.
pub const DEFAULT_CALLS: usize = 1_000_000;

pub const LARGE_PAYLOAD: usize = 65536;
pub const SMALL_PAYLOAD: usize = 1;

// =============================================================================
// Records
// =============================================================================

#[derive(Clone, Copy)]
pub struct Record<const N: usize> {
    data: [u8; N],
}

pub type LargeRecord = Record<LARGE_PAYLOAD>;
pub type SmallRecord = Record<SMALL_PAYLOAD>;

impl<const N: usize> Record<N> {
    pub const fn new() -> Self {
        Record { data: [0; N] }
    }

    pub const fn payload_len(&self) -> usize {
        self.data.len()
    }
}

impl<const N: usize> fmt::Debug for Record<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record").field("payload_len", &N).finish()
    }
}

#[inline(never)]
pub fn pass_by_value<const N: usize>(record: Record<N>) -> usize {
    black_box(record).payload_len()
}

#[inline(never)]
pub fn pass_by_ref<const N: usize>(record: &Record<N>) -> usize {
    black_box(record).payload_len()
}

// =============================================================================
// Batches
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSize {
    Large,
    Small,
}

impl RecordSize {
    pub fn payload_len(self) -> usize {
        match self {
            RecordSize::Large => LARGE_PAYLOAD,
            RecordSize::Small => SMALL_PAYLOAD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    ByValue,
    ByRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub size: RecordSize,
    pub convention: Convention,
}

impl Batch {
    /// Batches in the order they are run and reported.
    pub const ALL: [Batch; 4] = [
        Batch::new(RecordSize::Large, Convention::ByValue),
        Batch::new(RecordSize::Large, Convention::ByRef),
        Batch::new(RecordSize::Small, Convention::ByValue),
        Batch::new(RecordSize::Small, Convention::ByRef),
    ];

    pub const fn new(size: RecordSize, convention: Convention) -> Self {
        Batch { size, convention }
    }

    pub fn label(self) -> &'static str {
        match (self.size, self.convention) {
            (RecordSize::Large, Convention::ByValue) => "A: passing the val",
            (RecordSize::Large, Convention::ByRef) => "A: passing the ptr",
            (RecordSize::Small, Convention::ByValue) => "B: passing the val",
            (RecordSize::Small, Convention::ByRef) => "B: passing the ptr",
        }
    }

    pub fn expected_len(self) -> usize {
        self.size.payload_len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub batch: Batch,
    pub calls: usize,
    /// Payload length the called function reported.
    pub payload_len: usize,
    pub elapsed: Duration,
}

impl Measurement {
    pub fn label(&self) -> &'static str {
        self.batch.label()
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.label(), self.elapsed)
    }
}

// =============================================================================
// Timing
// =============================================================================

fn time_calls<F>(batch: Batch, calls: usize, mut call: F) -> Result<Measurement, TimerError>
where
    F: FnMut() -> usize,
{
    let expected = batch.expected_len();
    let mut payload_len = expected;
    let start = Instant::now();
    for i in 0..calls {
        let actual = call();
        if actual != expected {
            return Err(TimerError::UnexpectedSize {
                label: batch.label(),
                expected,
                actual,
                call: i,
            });
        }
        payload_len = actual;
    }
    let elapsed = start.elapsed();

    debug!(label = batch.label(), calls, ?elapsed, "batch completed");
    Ok(Measurement {
        batch,
        calls,
        payload_len,
        elapsed,
    })
}

/// Runs `calls` calls of the function `batch` describes.
pub fn measure_batch(batch: Batch, calls: usize) -> Result<Measurement, TimerError> {
    match (batch.size, batch.convention) {
        (RecordSize::Large, Convention::ByValue) => {
            let record = LargeRecord::new();
            time_calls(batch, calls, || pass_by_value(record))
        }
        (RecordSize::Large, Convention::ByRef) => {
            let record = LargeRecord::new();
            time_calls(batch, calls, || pass_by_ref(&record))
        }
        (RecordSize::Small, Convention::ByValue) => {
            let record = SmallRecord::new();
            time_calls(batch, calls, || pass_by_value(record))
        }
        (RecordSize::Small, Convention::ByRef) => {
            let record = SmallRecord::new();
            time_calls(batch, calls, || pass_by_ref(&record))
        }
    }
}

/// Measures every batch in order, writing each line to `out` as soon as its
/// batch finishes.
pub fn run_all<W: Write>(calls: usize, out: &mut W) -> Result<Vec<Measurement>, TimerError> {
    let mut measurements = Vec::with_capacity(Batch::ALL.len());
    for batch in Batch::ALL {
        let measurement = measure_batch(batch, calls)?;
        writeln!(out, "{}", measurement)?;
        out.flush()?;
        measurements.push(measurement);
    }
    Ok(measurements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_sizes() {
        assert_eq!(std::mem::size_of::<LargeRecord>(), 65536);
        assert_eq!(std::mem::size_of::<SmallRecord>(), 1);
        assert_eq!(SmallRecord::new().payload_len(), 1);
    }

    #[test]
    fn test_both_conventions_report_size() {
        let large = LargeRecord::new();
        assert_eq!(pass_by_value(large), 65536);
        assert_eq!(pass_by_ref(&large), 65536);

        let small = SmallRecord::new();
        assert_eq!(pass_by_value(small), 1);
        assert_eq!(pass_by_ref(&small), 1);
    }

    #[test]
    fn test_batch_order_and_labels() {
        let labels: Vec<&str> = Batch::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(
            labels,
            vec![
                "A: passing the val",
                "A: passing the ptr",
                "B: passing the val",
                "B: passing the ptr",
            ]
        );
    }

    #[test]
    fn test_measure_batch_counts_calls() {
        for batch in Batch::ALL {
            let measurement = measure_batch(batch, 1_000).unwrap();
            assert_eq!(measurement.calls, 1_000);
            assert_eq!(measurement.batch, batch);
            assert_eq!(measurement.payload_len, batch.expected_len());
        }
    }

    #[test]
    fn test_time_calls_invokes_exactly_n_times() {
        let batch = Batch::new(RecordSize::Small, Convention::ByRef);
        let mut count = 0;
        time_calls(batch, 1_000_000, || {
            count += 1;
            1
        })
        .unwrap();
        assert_eq!(count, 1_000_000);
    }

    #[test]
    fn test_unexpected_size_is_reported() {
        let batch = Batch::new(RecordSize::Large, Convention::ByValue);
        let mut n = 0;
        let result = time_calls(batch, 10, || {
            n += 1;
            if n == 4 { 1 } else { 65536 }
        });
        match result {
            Err(TimerError::UnexpectedSize {
                expected,
                actual,
                call,
                ..
            }) => {
                assert_eq!((expected, actual, call), (65536, 1, 3));
            }
            other => panic!("expected size mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_measurement_carries_reported_size() {
        let large = measure_batch(Batch::new(RecordSize::Large, Convention::ByRef), 10).unwrap();
        assert_eq!(large.payload_len, 65536);
        let small = measure_batch(Batch::new(RecordSize::Small, Convention::ByValue), 10).unwrap();
        assert_eq!(small.payload_len, 1);
    }

    #[test]
    fn test_zero_calls() {
        let measurement = measure_batch(Batch::ALL[0], 0).unwrap();
        assert_eq!(measurement.calls, 0);
    }

    #[test]
    fn test_measurement_display() {
        let measurement = Measurement {
            batch: Batch::ALL[1],
            calls: 1,
            payload_len: 65536,
            elapsed: Duration::from_micros(1500),
        };
        assert_eq!(measurement.to_string(), "A: passing the ptr: 1.5ms");
    }

    #[test]
    fn test_run_all_writes_lines_in_order() {
        let mut out = Vec::new();
        let measurements = run_all(100, &mut out).unwrap();
        assert_eq!(measurements.len(), 4);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        for (line, batch) in lines.iter().zip(Batch::ALL) {
            let prefix = format!("{}: ", batch.label());
            assert!(line.starts_with(&prefix), "{line}");
            assert!(line.len() > prefix.len());
        }
    }
}
