//! Fractional ranking and combined Magic Formula ordering.

use crate::metrics::DerivedMetrics;
use crate::returns::ReturnMetrics;
use serde::{Deserialize, Serialize};

/// A company that passed every filter but is not ranked yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Financials and derived metrics
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
    /// Trailing returns (informational only)
    #[serde(flatten)]
    pub returns: ReturnMetrics,
}

/// A ranked company, as reported to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Financials and derived metrics
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
    /// Trailing returns
    #[serde(flatten)]
    pub returns: ReturnMetrics,
    /// Rank by earnings yield (1 = highest)
    pub ey_rank: f64,
    /// Rank by return on capital (1 = highest)
    pub roc_rank: f64,
    /// `ey_rank + roc_rank`; lower is better
    pub combined_rank: f64,
}

impl RankedCandidate {
    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        self.metrics.symbol()
    }
}

/// Rank values in descending order, averaging the positions of ties.
///
/// The largest value gets rank 1. Two values tied for first both get 1.5,
/// three tied for second all get 3.0, and so on.
pub fn fractional_rank_desc(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }

        // positions start+1..=end share their mean
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }

    ranks
}

/// Rank candidates on both metrics and sort by combined rank.
///
/// The sort is stable, so candidates with equal combined rank keep the order
/// in which they were accepted.
pub fn rank_candidates(candidates: Vec<Candidate>) -> Vec<RankedCandidate> {
    let ey: Vec<f64> = candidates
        .iter()
        .map(|c| c.metrics.earnings_yield)
        .collect();
    let roc: Vec<f64> = candidates
        .iter()
        .map(|c| c.metrics.return_on_capital)
        .collect();
    let ey_ranks = fractional_rank_desc(&ey);
    let roc_ranks = fractional_rank_desc(&roc);

    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .zip(ey_ranks.into_iter().zip(roc_ranks))
        .map(|(candidate, (ey_rank, roc_rank))| RankedCandidate {
            metrics: candidate.metrics,
            returns: candidate.returns,
            ey_rank,
            roc_rank,
            combined_rank: ey_rank + roc_rank,
        })
        .collect();

    ranked.sort_by(|a, b| a.combined_rank.total_cmp(&b.combined_rank));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_metrics;
    use approx::assert_relative_eq;
    use magic_data::RawFinancials;
    use rstest::rstest;

    fn candidate(symbol: &str, ey: f64, roc: f64) -> Candidate {
        let mut raw = RawFinancials::new(symbol);
        raw.ebit = Some(1.0);
        raw.enterprise_value = Some(1.0);
        raw.total_assets = Some(1.0);
        raw.total_current_assets = Some(0.0);
        raw.total_current_liabilities = Some(0.0);
        let mut metrics = compute_metrics(&raw).unwrap();
        metrics.earnings_yield = ey;
        metrics.return_on_capital = roc;
        Candidate {
            metrics,
            returns: ReturnMetrics::default(),
        }
    }

    #[rstest]
    #[case(vec![10.0, 8.0, 6.0], vec![1.0, 2.0, 3.0])]
    #[case(vec![5.0, 5.0, 3.0], vec![1.5, 1.5, 3.0])]
    #[case(vec![3.0, 5.0, 5.0, 5.0], vec![4.0, 2.0, 2.0, 2.0])]
    #[case(vec![7.0], vec![1.0])]
    #[case(vec![], vec![])]
    fn test_fractional_rank(#[case] values: Vec<f64>, #[case] expected: Vec<f64>) {
        assert_eq!(fractional_rank_desc(&values), expected);
    }

    #[test]
    fn test_rank_sum_is_preserved() {
        let values = [4.0, 4.0, 2.0, 9.0, 2.0, 2.0, 1.0];
        let total: f64 = fractional_rank_desc(&values).iter().sum();
        let n = values.len() as f64;
        assert_relative_eq!(total, n * (n + 1.0) / 2.0);
    }

    #[test]
    fn test_rank_candidates_order() {
        let ranked = rank_candidates(vec![
            candidate("A", 10.0, 20.0),
            candidate("B", 8.0, 30.0),
            candidate("C", 6.0, 10.0),
        ]);

        let symbols: Vec<_> = ranked.iter().map(|r| r.symbol()).collect();
        assert_eq!(symbols, vec!["A", "B", "C"]);
        assert_eq!(ranked[0].combined_rank, 3.0);
        assert_eq!(ranked[1].combined_rank, 3.0);
        assert_eq!(ranked[2].combined_rank, 6.0);
        assert_eq!(ranked[1].ey_rank, 2.0);
        assert_eq!(ranked[1].roc_rank, 1.0);
    }

    #[test]
    fn test_ties_keep_acceptance_order() {
        let ranked = rank_candidates(vec![
            candidate("X", 5.0, 5.0),
            candidate("Y", 5.0, 5.0),
        ]);

        assert_eq!(ranked[0].symbol(), "X");
        assert_eq!(ranked[1].symbol(), "Y");
        assert_eq!(ranked[0].ey_rank, 1.5);
        assert_eq!(ranked[0].combined_rank, 3.0);
    }
}
