use mlsim_core::{ErrorInfo, MlsimError};
use mlsim_data::SimulatedData;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::FitConfig;
use crate::determinism::chain_seed;
use crate::draws::{ChainDraws, FittedModel};
use crate::gibbs::GibbsSampler;
use crate::model::ModelData;

/// Fits `measurement ~ 1 + condition + (1 + condition | participant)`.
///
/// Chains run on a dedicated pool of `config.cores` threads. Each chain owns
/// its RNG, seeded from `(config.seed, chain)`, and results are reordered by
/// chain index, so the draws do not depend on the core count.
pub fn fit(data: &SimulatedData, config: &FitConfig) -> Result<FittedModel, MlsimError> {
    config.validate()?;
    let model = ModelData::from_simulated(data)?;
    info!(
        rows = model.rows(),
        participants = model.participant_ids.len(),
        chains = config.chains,
        iterations = config.iterations,
        warmup = config.warmup,
        cores = config.cores,
        "fitting model"
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.cores)
        .build()
        .map_err(|err| MlsimError::Fit(ErrorInfo::new("thread-pool", err.to_string())))?;

    let results: Result<Vec<ChainDraws>, MlsimError> = pool.install(|| {
        (0..config.chains)
            .into_par_iter()
            .map(|chain| {
                let seed = chain_seed(config.seed, chain);
                debug!(chain, seed, "chain started");
                let draws = GibbsSampler::new(&model, &config.priors, seed).run(chain, seed, config)?;
                debug!(chain, draws = draws.draws.len(), "chain finished");
                Ok(draws)
            })
            .collect()
    });

    let mut chains = results?;
    chains.sort_by_key(|chain| chain.chain);
    let fitted = FittedModel {
        config: config.clone(),
        participant_ids: model.participant_ids.clone(),
        observations: model.rows(),
        chains,
    };
    info!(draws = fitted.draw_count(), "model fitted");
    Ok(fitted)
}
