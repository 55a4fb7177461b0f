//! Chart data shaping for the ranking view.
//!
//! Both series are indexed by triage level (slot 0 = level 1).

use crate::domain::{RankingEntry, TriageLevel, TriageStats};

/// Per-level series drawn by the distribution and risk charts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    /// Patients per triage level.
    pub distribution: [u64; 5],
    /// Mean mortality risk per triage level, in [0, 1].
    pub mean_risk: [f64; 5],
}

impl ChartData {
    #[must_use]
    pub fn from_snapshot(stats: &TriageStats, ranking: &[RankingEntry]) -> Self {
        Self {
            distribution: distribution(stats),
            mean_risk: mean_risk_by_level(ranking),
        }
    }
}

/// Count array from the `por_triage` mapping.
///
/// Missing levels are zero; keys that are not a level 1-5 are ignored.
#[must_use]
pub fn distribution(stats: &TriageStats) -> [u64; 5] {
    let mut counts = [0u64; 5];
    for (key, count) in &stats.por_triage {
        let level = key
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(TriageLevel::from_level);
        match level {
            Some(level) => counts[level.index()] = *count,
            None => tracing::warn!(key = %key, "ignoring unknown triage level in stats"),
        }
    }
    counts
}

/// Mean mortality risk of the ranked patients at each level.
#[must_use]
pub fn mean_risk_by_level(ranking: &[RankingEntry]) -> [f64; 5] {
    let mut sums = [0.0f64; 5];
    let mut counts = [0u32; 5];

    for entry in ranking {
        if let Some(level) = entry.level() {
            sums[level.index()] += entry.riesgo_mortalidad;
            counts[level.index()] += 1;
        }
    }

    let mut means = [0.0f64; 5];
    for i in 0..5 {
        if counts[i] > 0 {
            means[i] = (sums[i] / f64::from(counts[i])).clamp(0.0, 1.0);
        }
    }
    means
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sex;

    fn entry(level: u8, risk: f64) -> RankingEntry {
        RankingEntry {
            posicion: 1,
            id: 1,
            nivel_triage: level,
            color_triage: String::new(),
            edad: "40".into(),
            sexo: Some(Sex::Male),
            riesgo_mortalidad: risk,
            atendido: false,
        }
    }

    #[test]
    fn test_distribution_fills_missing_levels() {
        let stats: TriageStats =
            serde_json::from_str(r#"{"por_triage":{"1":3,"3":2}}"#).expect("Should parse");
        assert_eq!(distribution(&stats), [3, 0, 2, 0, 0]);
    }

    #[test]
    fn test_distribution_ignores_unknown_keys() {
        let stats: TriageStats = serde_json::from_str(r#"{"por_triage":{"0":9,"6":1,"x":4,"5":1}}"#)
            .expect("Should parse");
        assert_eq!(distribution(&stats), [0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_mean_risk_by_level() {
        let ranking = vec![entry(1, 0.4), entry(1, 0.2), entry(4, 0.01), entry(9, 0.9)];
        let means = mean_risk_by_level(&ranking);

        assert!((means[0] - 0.3).abs() < 1e-9);
        assert_eq!(means[1], 0.0);
        assert!((means[3] - 0.01).abs() < 1e-9);
        assert_eq!(means[4], 0.0);
    }

    #[test]
    fn test_empty_snapshot() {
        let data = ChartData::from_snapshot(&TriageStats::default(), &[]);
        assert_eq!(data, ChartData::default());
    }
}
