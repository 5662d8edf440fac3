//! Binary-classification evaluation: accuracy, rank-based ROC-AUC, and a
//! per-class precision/recall/F1 report.

use serde::Serialize;
use std::fmt;

pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Area under the ROC curve via the Mann-Whitney statistic with average
/// ranks for tied scores. `None` when only one class is present.
pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> Option<f64> {
    let n_pos = y_true.iter().filter(|&&l| l == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0f64; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = avg_rank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(&l, _)| l == 1)
        .map(|(_, r)| r)
        .sum();
    let u = pos_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Some(u / (n_pos * n_neg) as f64)
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn class_metrics(label: u8, y_true: &[u8], y_pred: &[u8]) -> ClassMetrics {
    let tp = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|&(&t, &p)| t == label && p == label)
        .count() as f64;
    let pred_n = y_pred.iter().filter(|&&p| p == label).count() as f64;
    let support = y_true.iter().filter(|&&t| t == label).count();
    let precision = if pred_n > 0.0 { tp / pred_n } else { 0.0 };
    let recall = if support > 0 { tp / support as f64 } else { 0.0 };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    ClassMetrics {
        label: label.to_string(),
        precision,
        recall,
        f1,
        support,
    }
}

pub fn classification_report(y_true: &[u8], y_pred: &[u8]) -> ClassificationReport {
    let classes: Vec<ClassMetrics> = [0u8, 1u8]
        .iter()
        .map(|&l| class_metrics(l, y_true, y_pred))
        .collect();
    let n = classes.len() as f64;
    let total: usize = classes.iter().map(|c| c.support).sum();

    let macro_avg = ClassMetrics {
        label: "macro avg".to_string(),
        precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
        recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
        f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
        support: total,
    };
    let weight = |f: fn(&ClassMetrics) -> f64| -> f64 {
        if total == 0 {
            return 0.0;
        }
        classes
            .iter()
            .map(|c| f(c) * c.support as f64)
            .sum::<f64>()
            / total as f64
    };
    let weighted_avg = ClassMetrics {
        label: "weighted avg".to_string(),
        precision: weight(|c| c.precision),
        recall: weight(|c| c.recall),
        f1: weight(|c| c.f1),
        support: total,
    };

    ClassificationReport {
        accuracy: accuracy(y_true, y_pred),
        classes,
        macro_avg,
        weighted_avg,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(
            f,
            "{:>14} {:>32.2} {:>10}",
            "accuracy", self.accuracy, self.macro_avg.support
        )?;
        for c in [&self.macro_avg, &self.weighted_avg] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_counts_matches() {
        assert_eq!(accuracy(&[1, 0, 1, 0], &[1, 0, 0, 0]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn auc_is_one_for_perfect_ranking() {
        let auc = roc_auc(&[0, 0, 1, 1], &[0.1, 0.2, 0.8, 0.9]).unwrap();
        assert!((auc - 1.0).abs() < 1e-9);
    }

    #[test]
    fn auc_is_half_for_constant_scores() {
        let auc = roc_auc(&[0, 1, 0, 1], &[0.5, 0.5, 0.5, 0.5]).unwrap();
        assert!((auc - 0.5).abs() < 1e-9);
    }

    #[test]
    fn auc_undefined_for_single_class() {
        assert!(roc_auc(&[1, 1], &[0.2, 0.9]).is_none());
    }

    #[test]
    fn report_has_both_classes_and_averages() {
        let y_true = [0, 0, 1, 1, 1];
        let y_pred = [0, 1, 1, 1, 0];
        let report = classification_report(&y_true, &y_pred);
        assert_eq!(report.classes.len(), 2);
        assert_eq!(report.classes[1].support, 3);
        assert!((report.classes[1].precision - 2.0 / 3.0).abs() < 1e-9);
        assert!((report.classes[1].recall - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.macro_avg.support, 5);
        let rendered = report.to_string();
        assert!(rendered.contains("weighted avg"));
    }
}
