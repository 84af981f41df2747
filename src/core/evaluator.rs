//! Drop test evaluation engine
//!
//! Turns the 16 rows of raw misfire counts of a primer drop test into derived
//! per-row statistics, pools them into the mean drop height (H-bar), standard
//! deviation and the H+ / H- confidence bounds, and applies the two-stage
//! disposition gate:
//!
//! ```text
//! Stage A:  H+nS <= spec H+  AND  H-nS >= spec H-      (else Retest)
//! Stage B:  firing pin meas >= firing pin min spec     (only when min spec set)
//! ```
//!
//! Any missing input needed for a decision yields `InProgress`, never `Accept`.
//! The evaluator is a pure function: no I/O, no shared state.

use serde::{Deserialize, Serialize};

/// Number of drop height levels in a test (level 1 lowest, level 16 highest)
pub const LEVEL_COUNT: usize = 16;

/// Misfire counts indexed by level, `counts[0]` is level 1
pub type MisfireCounts = [Option<u32>; LEVEL_COUNT];

/// Whether a test is a regular run or a retest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestType {
    #[default]
    RegularRun,
    Retest,
}

impl TestType {
    /// Parse a free-text test type; only "Retest" selects the retest spec pair
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("retest") {
            TestType::Retest
        } else {
            TestType::RegularRun
        }
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestType::RegularRun => write!(f, "Regular Run"),
            TestType::Retest => write!(f, "Retest"),
        }
    }
}

/// Final classification of a drop test
///
/// [`evaluate`] only ever yields `InProgress`, `Accept` or `Retest`.
/// `Reject` is set by hand on a stored test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    #[default]
    InProgress,
    Accept,
    Retest,
    Reject,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::InProgress => write!(f, "In-Progress"),
            Disposition::Accept => write!(f, "Accept"),
            Disposition::Retest => write!(f, "Retest"),
            Disposition::Reject => write!(f, "Reject"),
        }
    }
}

/// Spec thresholds and context needed to evaluate one test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSpecification {
    /// Units fired per drop height level
    pub sample_size: u32,

    /// Multiplier for the upper bound (H+)
    pub h_plus_type: Option<f64>,

    /// Multiplier for the lower bound (H-)
    pub h_minus_type: Option<f64>,

    /// Regular run or retest
    pub test_type: TestType,

    /// Upper acceptance threshold for a regular run
    pub test_h_plus: Option<f64>,

    /// Lower acceptance threshold for a regular run
    pub test_h_minus: Option<f64>,

    /// Upper acceptance threshold for a retest
    pub retest_h_plus: Option<f64>,

    /// Lower acceptance threshold for a retest
    pub retest_h_minus: Option<f64>,

    /// Minimum firing pin protrusion; `None` or zero disables the check
    pub firing_pin_min_spec: Option<f64>,

    /// Measured firing pin protrusion
    pub firing_pin_meas: Option<f64>,
}

impl TestSpecification {
    /// The (H+, H-) spec pair that applies to this test type
    pub fn selected_spec(&self) -> (Option<f64>, Option<f64>) {
        match self.test_type {
            TestType::Retest => (self.retest_h_plus, self.retest_h_minus),
            TestType::RegularRun => (self.test_h_plus, self.test_h_minus),
        }
    }
}

/// One drop height row with its derived values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DropHeightRow {
    /// Level 1..=16
    pub level: u8,
    /// Raw input, `None` when not measured
    pub misfires: Option<u32>,
    pub number_fired: i64,
    pub percent_misfire: i64,
    pub variance_factor_k: i64,
    pub ptimes_k: i64,
    pub skewness_factor_s: i64,
    pub ptimes_s: i64,
}

/// Full output of an evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub rows: [DropHeightRow; LEVEL_COUNT],
    pub all_fire_height: Option<u8>,
    pub no_fire_height: Option<u8>,
    /// (Σ %MF - 100) / 100
    pub total_p: f64,
    /// Σ P*K / 100
    pub total_pk: f64,
    pub h_bar: Option<f64>,
    pub s_dev: Option<f64>,
    pub h5s: Option<f64>,
    pub h2s: Option<f64>,
    /// Spec H+ selected by test type
    pub spec_h_plus: Option<f64>,
    /// Spec H- selected by test type
    pub spec_h_minus: Option<f64>,
    pub disposition: Disposition,
}

impl Evaluation {
    /// Row for a level (1..=16)
    pub fn row(&self, level: u8) -> Option<&DropHeightRow> {
        if (1..=LEVEL_COUNT as u8).contains(&level) {
            Some(&self.rows[level as usize - 1])
        } else {
            None
        }
    }

    /// Sum of the %MF column
    pub fn percent_misfire_sum(&self) -> i64 {
        self.rows.iter().map(|r| r.percent_misfire).sum()
    }

    /// Sum of the P*K column
    pub fn ptimes_k_sum(&self) -> i64 {
        self.rows.iter().map(|r| r.ptimes_k).sum()
    }

    /// Sum of the P*S column
    pub fn ptimes_s_sum(&self) -> i64 {
        self.rows.iter().map(|r| r.ptimes_s).sum()
    }
}

/// Round half toward positive infinity
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to two decimal places, ties toward positive infinity
fn round2(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

/// Highest level with a recorded misfire count
pub fn all_fire_height(misfires: &MisfireCounts) -> Option<u8> {
    (1..=LEVEL_COUNT)
        .rev()
        .find(|&level| misfires[level - 1].is_some())
        .map(|level| level as u8)
}

/// Highest level at which every fired unit misfired
pub fn no_fire_height(misfires: &MisfireCounts, sample_size: u32) -> Option<u8> {
    (1..=LEVEL_COUNT)
        .filter(|&level| misfires[level - 1].is_some_and(|m| m >= sample_size))
        .last()
        .map(|level| level as u8)
}

/// Skewness factor S = 3n² - 3n + 1 for rows strictly above the no-fire
/// height and at or below the all-fire height
fn skewness_factor(level: u8, no_fire: Option<u8>, all_fire: Option<u8>) -> i64 {
    let (Some(no_fire), Some(all_fire)) = (no_fire, all_fire) else {
        return 0;
    };

    let n = level as i64 - no_fire as i64;
    if n >= 1 && level <= all_fire {
        3 * n * n - 3 * n + 1
    } else {
        0
    }
}

/// Compute the derived columns for all 16 rows
///
/// The variance factor K is a running ladder 1, 3, 5, ... that restarts at 1
/// after any row whose K is 0, so it is folded left to right with a single
/// accumulator.
pub fn derive_rows(
    misfires: &MisfireCounts,
    sample_size: u32,
    no_fire: Option<u8>,
    all_fire: Option<u8>,
) -> [DropHeightRow; LEVEL_COUNT] {
    let mut rows = [DropHeightRow::default(); LEVEL_COUNT];
    let mut prev_k: i64 = 0;

    for (idx, row) in rows.iter_mut().enumerate() {
        let level = (idx + 1) as u8;
        row.level = level;
        row.misfires = misfires[idx];

        // Unmeasured rows, or rows with no sample to divide by, stay at zero
        let Some(count) = misfires[idx].filter(|_| sample_size > 0) else {
            prev_k = 0;
            continue;
        };

        let count = count as i64;
        let sample = sample_size as i64;

        row.number_fired = (sample - count).max(0);
        row.percent_misfire = round_half_up(count as f64 / sample as f64 * 100.0) as i64;

        row.variance_factor_k = match row.percent_misfire {
            100 => 0,
            p if (0..100).contains(&p) => {
                if prev_k == 0 {
                    1
                } else {
                    prev_k + 2
                }
            }
            _ => 0,
        };
        row.ptimes_k = row.percent_misfire * row.variance_factor_k;

        row.skewness_factor_s = skewness_factor(level, no_fire, all_fire);
        row.ptimes_s = row.percent_misfire * row.skewness_factor_s;

        prev_k = row.variance_factor_k;
    }

    rows
}

/// Two-stage disposition gate
///
/// Stage B (firing pin) is only reached after Stage A (statistical bounds)
/// passes.
pub fn decide_disposition(
    h5s: Option<f64>,
    h2s: Option<f64>,
    spec_h_plus: Option<f64>,
    spec_h_minus: Option<f64>,
    firing_pin_min_spec: Option<f64>,
    firing_pin_meas: Option<f64>,
) -> Disposition {
    let (Some(h5s), Some(h2s), Some(spec_h_plus), Some(spec_h_minus)) =
        (h5s, h2s, spec_h_plus, spec_h_minus)
    else {
        return Disposition::InProgress;
    };

    if !(h5s <= spec_h_plus && h2s >= spec_h_minus) {
        return Disposition::Retest;
    }

    let min_spec = match firing_pin_min_spec {
        None => return Disposition::Accept,
        Some(min) if min == 0.0 => return Disposition::Accept,
        Some(min) => min,
    };

    match firing_pin_meas {
        None => Disposition::Retest,
        Some(meas) if meas >= min_spec => Disposition::Accept,
        Some(_) => Disposition::Retest,
    }
}

/// Evaluate a drop test from its raw misfire counts
pub fn evaluate(misfires: &MisfireCounts, spec: &TestSpecification) -> Evaluation {
    let sample_size = spec.sample_size;

    if sample_size == 0 && misfires.iter().any(Option::is_some) {
        log::warn!("sample size is 0; misfire percentages cannot be formed, all rows derive to 0");
    }

    let all_fire = all_fire_height(misfires);
    let no_fire = no_fire_height(misfires, sample_size);
    let rows = derive_rows(misfires, sample_size, no_fire, all_fire);

    let percent_sum: i64 = rows.iter().map(|r| r.percent_misfire).sum();
    let pk_sum: i64 = rows.iter().map(|r| r.ptimes_k).sum();

    let total_p = (percent_sum as f64 - 100.0) / 100.0;
    let total_pk = pk_sum as f64 / 100.0;

    let h_bar = no_fire.map(|nf| round2(nf as f64 + 0.5 + total_p));

    let variance = total_pk - total_p * total_p;
    let s_dev = (variance >= 0.0).then(|| variance.sqrt());

    let h5s = match (h_bar, s_dev, spec.h_plus_type) {
        (Some(h_bar), Some(s_dev), Some(mult)) => Some(round2(h_bar + mult * s_dev)),
        _ => None,
    };
    let h2s = match (h_bar, s_dev, spec.h_minus_type) {
        (Some(h_bar), Some(s_dev), Some(mult)) => Some(round2(h_bar - mult * s_dev)),
        _ => None,
    };

    let (spec_h_plus, spec_h_minus) = spec.selected_spec();
    let disposition = decide_disposition(
        h5s,
        h2s,
        spec_h_plus,
        spec_h_minus,
        spec.firing_pin_min_spec,
        spec.firing_pin_meas,
    );

    log::debug!(
        "evaluated drop test: all_fire={:?} no_fire={:?} h_bar={:?} s_dev={:?} h5s={:?} h2s={:?} -> {}",
        all_fire,
        no_fire,
        h_bar,
        s_dev,
        h5s,
        h2s,
        disposition
    );

    Evaluation {
        rows,
        all_fire_height: all_fire,
        no_fire_height: no_fire,
        total_p,
        total_pk,
        h_bar,
        s_dev,
        h5s,
        h2s,
        spec_h_plus,
        spec_h_minus,
        disposition,
    }
}
