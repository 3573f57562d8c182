//! Convergence diagnostics over per-chain traces.

use mlsim_core::stats;

/// Largest lag inspected when summing autocorrelations.
const MAX_LAG: usize = 250;

/// Split-R̂: each chain is halved and the between/within variance ratio is
/// computed over the `2 * chains` half-sequences.
///
/// Returns `NaN` when fewer than four draws per chain are available, and 1.0
/// when every half-sequence is constant.
pub fn split_rhat(chains: &[Vec<f64>]) -> f64 {
    let half = chains.iter().map(Vec::len).min().unwrap_or(0) / 2;
    if half < 2 {
        return f64::NAN;
    }
    let halves: Vec<&[f64]> = chains
        .iter()
        .flat_map(|chain| [&chain[..half], &chain[half..2 * half]])
        .collect();
    let n = half as f64;
    let means: Vec<f64> = halves.iter().map(|seq| stats::mean(seq)).collect();
    let within = stats::mean(&halves.iter().map(|seq| stats::variance(seq)).collect::<Vec<_>>());
    let between = n * stats::variance(&means);
    if within <= 0.0 {
        return 1.0;
    }
    let pooled = (n - 1.0) / n * within + between / n;
    (pooled / within).sqrt()
}

/// Effective sample size summed over chains.
///
/// Per chain: `ESS = N / (1 + 2 Σₖ ρₖ)`, truncating the sum at the first lag
/// whose autocorrelation drops below 0.05.
pub fn effective_sample_size(chains: &[Vec<f64>]) -> f64 {
    chains.iter().map(|chain| chain_ess(chain)).sum()
}

fn chain_ess(chain: &[f64]) -> f64 {
    let n = chain.len();
    if n < 2 {
        return n as f64;
    }
    let mean = stats::mean(chain);
    let var = chain.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
    if var < 1e-12 {
        return n as f64;
    }
    let mut sum_rho = 0.0;
    for k in 1..=MAX_LAG.min(n / 2) {
        let rho = autocorrelation(chain, k, mean, var);
        if rho < 0.05 {
            break;
        }
        sum_rho += rho;
    }
    n as f64 / (1.0 + 2.0 * sum_rho)
}

fn autocorrelation(chain: &[f64], k: usize, mean: f64, var: f64) -> f64 {
    let n = chain.len();
    if k >= n {
        return 0.0;
    }
    let cov = (0..n - k)
        .map(|i| (chain[i] - mean) * (chain[i + k] - mean))
        .sum::<f64>()
        / (n - k) as f64;
    cov / var
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlsim_core::RngHandle;

    #[test]
    fn independent_chains_have_rhat_near_one() {
        let mut rng = RngHandle::from_seed(9);
        let chains: Vec<Vec<f64>> = (0..4)
            .map(|_| (0..500).map(|_| rng.standard_normal()).collect())
            .collect();
        let rhat = split_rhat(&chains);
        assert!((rhat - 1.0).abs() < 0.02, "rhat = {rhat}");
        let ess = effective_sample_size(&chains);
        assert!(ess > 1500.0, "ess = {ess}");
    }

    #[test]
    fn separated_chains_have_large_rhat() {
        let mut rng = RngHandle::from_seed(9);
        let chains: Vec<Vec<f64>> = (0..2)
            .map(|offset| {
                (0..200)
                    .map(|_| rng.standard_normal() + 5.0 * offset as f64)
                    .collect()
            })
            .collect();
        assert!(split_rhat(&chains) > 1.5);
    }

    #[test]
    fn autocorrelated_chain_has_reduced_ess() {
        let mut rng = RngHandle::from_seed(4);
        let mut value = 0.0;
        let chain: Vec<f64> = (0..2000)
            .map(|_| {
                value = 0.9 * value + rng.standard_normal();
                value
            })
            .collect();
        assert!(effective_sample_size(&[chain]) < 600.0);
    }

    #[test]
    fn short_chains_yield_nan() {
        assert!(split_rhat(&[vec![1.0, 2.0, 3.0]]).is_nan());
    }
}
