//! Synthetic room data for demos, offline development and degraded polling.
//!
//! Current readings are drawn uniformly at random on every call. History
//! series follow one sinusoid per quantity plus bounded noise; the sinusoid's
//! phase is derived from the room name, so the same room always has the same
//! waveform skeleton while the noise differs from call to call.
//!
//! # Example
//!
//! ```
//! use remo_core::synthetic::{SyntheticGenerator, history_series};
//!
//! let generator = SyntheticGenerator::default();
//! assert_eq!(generator.current_readings().len(), 3);
//!
//! let series = history_series("Kitchen", 24);
//! assert_eq!(series.len(), 24 * 12 + 1);
//! ```

use std::f64::consts::TAU;

use rand::Rng;
use time::{Duration, OffsetDateTime};

use remo_types::{HistoryDataPoint, RoomData, RoomHistoryData};

/// Rooms used when nothing else is configured.
pub const DEFAULT_ROOMS: [&str; 3] = ["Living Room", "Bedroom", "Study"];

/// History samples per hour (one every 5 minutes).
pub const SAMPLES_PER_HOUR: u32 = 12;

/// Spacing between history samples.
pub const SAMPLE_INTERVAL: Duration = Duration::minutes(5);

/// Upper bound (exclusive) of the additive temperature noise.
pub const TEMPERATURE_NOISE: f64 = 2.0;
/// Upper bound (exclusive) of the additive humidity noise.
pub const HUMIDITY_NOISE: f64 = 5.0;
/// Upper bound (exclusive) of the additive illumination noise.
pub const ILLUMINATION_NOISE: f64 = 20.0;

/// Generator for current readings over a fixed room list.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticGenerator {
    rooms: Vec<String>,
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self {
            rooms: DEFAULT_ROOMS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl SyntheticGenerator {
    /// Create a generator for the given rooms.
    ///
    /// An empty list falls back to [`DEFAULT_ROOMS`] so a degraded cycle never
    /// produces an empty dashboard.
    pub fn new<I, S>(rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rooms: Vec<String> = rooms.into_iter().map(Into::into).collect();
        if rooms.is_empty() {
            Self::default()
        } else {
            Self { rooms }
        }
    }

    /// Room names this generator produces.
    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    /// One random reading per room, all stamped with the current time.
    ///
    /// Temperature is in [20, 28), humidity in [40, 70), illumination in
    /// [0, 100).
    pub fn current_readings(&self) -> Vec<RoomData> {
        self.current_readings_with_rng(&mut rand::rng(), OffsetDateTime::now_utc())
    }

    /// [`current_readings`](Self::current_readings) with an explicit RNG and clock.
    pub fn current_readings_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: OffsetDateTime,
    ) -> Vec<RoomData> {
        self.rooms
            .iter()
            .map(|name| RoomData {
                name: name.clone(),
                temperature: Some(rng.random_range(20.0..28.0)),
                humidity: Some(rng.random_range(40.0..70.0)),
                illumination: Some(rng.random_range(0.0..100.0)),
                last_updated: now,
            })
            .collect()
    }

    /// History series for `room`, wrapped with its name.
    pub fn history(&self, room: &str, hours: u32) -> RoomHistoryData {
        RoomHistoryData {
            room_name: room.to_string(),
            data: history_series(room, hours),
        }
    }
}

/// Deterministic phase offset in [0, 2π) for a room name.
///
/// Rolling `h * 31 + c` hash over the characters in wrapping 32-bit
/// arithmetic, reduced to one of 1000 buckets.
pub fn phase_offset(room: &str) -> f64 {
    let hash = room
        .chars()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(c as i32));
    let bucket = (hash % 1000).unsigned_abs();
    f64::from(bucket) / 1000.0 * TAU
}

/// Noise-free waveform values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub temperature: f64,
    pub humidity: f64,
    pub illumination: f64,
}

/// Waveform skeleton at `step` samples before now for the given phase.
///
/// Temperature has a slower angular frequency than humidity and illumination.
pub fn baseline(phase: f64, step: u64) -> Baseline {
    let i = step as f64;
    Baseline {
        temperature: 22.0 + (i / 12.0 + phase).sin() * 4.0,
        humidity: 50.0 + (i / 6.0 + phase).sin() * 15.0,
        illumination: 50.0 + (i / 6.0 + phase).sin() * 40.0,
    }
}

/// `hours * 12 + 1` points, oldest first, the newest stamped now.
///
/// Samples that would fall before the earliest representable date are
/// omitted.
pub fn history_series(room: &str, hours: u32) -> Vec<HistoryDataPoint> {
    history_series_with_rng(room, hours, OffsetDateTime::now_utc(), &mut rand::rng())
}

/// [`history_series`] with an explicit clock and RNG.
///
/// A seeded RNG reproduces the series exactly.
pub fn history_series_with_rng<R: Rng + ?Sized>(
    room: &str,
    hours: u32,
    now: OffsetDateTime,
    rng: &mut R,
) -> Vec<HistoryDataPoint> {
    let phase = phase_offset(room);
    let steps = u64::from(hours) * u64::from(SAMPLES_PER_HOUR);

    (0..=steps)
        .rev()
        .filter_map(|step| {
            let offset = i64::try_from(step)
                .ok()?
                .checked_mul(SAMPLE_INTERVAL.whole_seconds())?;
            let timestamp = now.checked_sub(Duration::seconds(offset))?;
            let skeleton = baseline(phase, step);
            Some(HistoryDataPoint {
                timestamp,
                temperature: Some(
                    skeleton.temperature + rng.random_range(0.0..TEMPERATURE_NOISE),
                ),
                humidity: Some(skeleton.humidity + rng.random_range(0.0..HUMIDITY_NOISE)),
                illumination: Some(
                    (skeleton.illumination + rng.random_range(0.0..ILLUMINATION_NOISE)).max(0.0),
                ),
            })
        })
        .collect()
}
