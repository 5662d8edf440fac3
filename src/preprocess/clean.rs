//! Cleaning primitives: statistics over raw columns and the fixed bucket
//! definitions used for derived categorical features.

use std::collections::BTreeMap;

/// Median with linear interpolation on even counts. Returns 0.0 for an
/// empty column so a fully missing column imputes to zero.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Linearly interpolated percentile, `q` in [0, 1].
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = pos - lower as f64;
        sorted[lower] + frac * (sorted[upper] - sorted[lower])
    }
}

/// Most frequent value; ties resolve to the lexicographically smallest so
/// the fitted state is deterministic. `None` when the column is empty.
pub fn mode(values: &[String]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(v, _)| v.to_string())
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// A derived categorical column: `source` values are binned into `labels`
/// along fixed `edges` (bin i is `(edges[i], edges[i+1]]`).
pub struct BucketSpec {
    pub column: &'static str,
    pub source: &'static str,
    pub edges: &'static [f64],
    pub labels: &'static [&'static str],
}

pub const BUCKETS: [BucketSpec; 4] = [
    BucketSpec {
        column: "age_group",
        source: "age",
        edges: &[0.0, 30.0, 45.0, 60.0, 100.0],
        labels: &["Young", "Adult", "Middle", "Senior"],
    },
    BucketSpec {
        column: "bmi_category",
        source: "bmi",
        edges: &[0.0, 18.5, 25.0, 30.0, 100.0],
        labels: &["Underweight", "Normal", "Overweight", "Obese"],
    },
    BucketSpec {
        column: "HbA1c_risk",
        source: "HbA1c_level",
        edges: &[0.0, 5.6, 6.4, 10.0],
        labels: &["Normal", "Prediabetes", "Diabetes"],
    },
    BucketSpec {
        column: "glucose_risk",
        source: "blood_glucose_level",
        edges: &[0.0, 100.0, 125.0, 200.0, 300.0],
        labels: &["Normal", "Prediabetic", "Diabetic", "High"],
    },
];

impl BucketSpec {
    /// Label for a value. Values beyond the outer edges clamp to the first
    /// or last label; after percentile capping that path is unreachable on
    /// training data.
    pub fn label_for(&self, value: f64) -> &'static str {
        for (i, label) in self.labels.iter().enumerate() {
            if value <= self.edges[i + 1] {
                return label;
            }
        }
        self.labels[self.labels.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_interpolates_even_counts() {
        assert_eq!(median(&[1.0, 3.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 10.0]), 2.0);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn percentile_matches_linear_interpolation() {
        let v: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        assert!((percentile(&v, 0.01) - 1.99).abs() < 1e-9);
        assert!((percentile(&v, 0.99) - 99.01).abs() < 1e-9);
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 1.0), 100.0);
    }

    #[test]
    fn mode_breaks_ties_deterministically() {
        let vals: Vec<String> = ["b", "a", "b", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(mode(&vals), Some("a".to_string()));
        assert_eq!(mode(&[]), None);
    }

    #[test]
    fn bucket_edges_are_inclusive_on_the_right() {
        let age = &BUCKETS[0];
        assert_eq!(age.label_for(30.0), "Young");
        assert_eq!(age.label_for(30.1), "Adult");
        assert_eq!(age.label_for(45.0), "Adult");
        assert_eq!(age.label_for(60.0), "Middle");
        assert_eq!(age.label_for(61.0), "Senior");
        assert_eq!(age.label_for(150.0), "Senior");
        assert_eq!(age.label_for(-1.0), "Young");

        let bmi = &BUCKETS[1];
        assert_eq!(bmi.label_for(18.5), "Underweight");
        assert_eq!(bmi.label_for(25.0), "Normal");
        assert_eq!(bmi.label_for(28.5), "Overweight");
        assert_eq!(bmi.label_for(31.0), "Obese");

        let glucose = &BUCKETS[3];
        assert_eq!(glucose.label_for(100.0), "Normal");
        assert_eq!(glucose.label_for(125.0), "Prediabetic");
        assert_eq!(glucose.label_for(140.0), "Diabetic");
        assert_eq!(glucose.label_for(250.0), "High");
    }
}
