/// Lower bound of every vital.
pub const VITAL_MIN: f64 = 0.0;

/// Upper bound of every vital.
pub const VITAL_MAX: f64 = 10.0;

/// Starting level for a freshly hatched companion (mid-scale).
pub const VITAL_START: f64 = 5.0;

/// Smallest experience award an activity can produce.
pub const AWARD_MIN: u32 = 20;

/// Largest experience award an activity can produce.
pub const AWARD_MAX: u32 = 80;

/// Experience at which a Baby becomes a Teen.
pub const TEEN_THRESHOLD: f64 = 500.0;

/// Experience at which a Teen becomes an Adult.
pub const ADULT_THRESHOLD: f64 = 1500.0;

/// Vital level at or below which the companion is in a critical state.
pub const CRITICAL_LEVEL: f64 = 2.0;

/// Vital level at or below which the companion starts to complain.
pub const WARNING_LEVEL: f64 = 4.0;

/// Happiness required for the Happy mood.
pub const HAPPY_LEVEL: f64 = 6.0;

/// Happiness required for the Radiant mood.
pub const RADIANT_HAPPINESS: f64 = 8.0;

/// Hunger and energy required for the Radiant mood.
pub const RADIANT_SUPPORT: f64 = 7.0;

/// How long a single idle blink frame is held.
pub const BLINK_HOLD_SECS: f64 = 0.2;

/// Allowed range for the idle blink cadence.
pub const BLINK_INTERVAL_RANGE: (f64, f64) = (30.0, 60.0);

/// Deep Sleep duration started by a rest.
pub const DEEP_SLEEP_SECS: f64 = 3600.0;

/// Energy restored by starting a rest.
pub const REST_ENERGY_GAIN: f64 = 2.0;

/// Number Pulse targets are drawn from `1..=PULSE_MAX`.
pub const PULSE_MAX: u8 = 10;

/// Journal keeps only the most recent entries.
pub const JOURNAL_CAP: usize = 100;
