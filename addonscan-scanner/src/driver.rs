//! Bounded-concurrency parsing of every candidate.

use std::collections::HashSet;
use std::sync::Arc;

use addonscan_core::{Addon, Candidate, InvalidAddon, ScanConfig};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::parser::CandidateParser;

/// What a parse run produced.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Parsed addons, in completion order.
    pub addons: Vec<Addon>,
    /// Candidates that failed, with the reason.
    pub invalid: Vec<InvalidAddon>,
    /// Candidates deliberately left out, such as untouched template copies.
    pub excluded: Vec<String>,
    /// Candidates skipped because the invalid log already lists them.
    pub skipped: usize,
}

/// Runs a [`CandidateParser`] over a candidate list with at most `workers`
/// parses in flight.
pub struct ParseDriver {
    parser: Arc<dyn CandidateParser>,
    config: Arc<ScanConfig>,
    workers: usize,
    known_invalid: HashSet<String>,
}

impl ParseDriver {
    /// Creates a driver.
    pub fn new(parser: Arc<dyn CandidateParser>, config: Arc<ScanConfig>, workers: usize) -> Self {
        Self {
            parser,
            config,
            workers: workers.max(1),
            known_invalid: HashSet::new(),
        }
    }

    /// Skips these identifiers unless they are verified. Matching ignores
    /// case.
    pub fn with_known_invalid<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known_invalid = ids
            .into_iter()
            .map(|id| id.as_ref().trim().to_lowercase())
            .filter(|id| !id.is_empty())
            .collect();
        self
    }

    /// Parses every candidate and waits for all of them.
    pub async fn run(&self, candidates: Vec<Candidate>) -> ParseOutcome {
        let total = candidates.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let results = Arc::new(Mutex::new(ParseOutcome::default()));
        let mut tasks = JoinSet::new();
        let mut skipped = 0;

        info!(total, workers = self.workers, "Parsing candidates");

        for mut candidate in candidates {
            candidate.verified = candidate.verified || self.config.is_verified(&candidate.id);
            if !candidate.verified && self.known_invalid.contains(&candidate.id.to_lowercase()) {
                debug!(repo = %candidate.id, "Listed as invalid, skipping");
                skipped += 1;
                continue;
            }

            let parser = Arc::clone(&self.parser);
            let semaphore = Arc::clone(&semaphore);
            let results = Arc::clone(&results);

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };

                match parser.parse(&candidate).await {
                    Ok(Some(mut addon)) => {
                        addon.verified = candidate.verified;
                        results.lock().await.addons.push(addon);
                    }
                    Ok(None) => {
                        info!(repo = %candidate.id, "Excluded");
                        results.lock().await.excluded.push(candidate.id);
                    }
                    Err(e) => {
                        warn!(repo = %candidate.id, error = %e, "Failed to parse");
                        results
                            .lock()
                            .await
                            .invalid
                            .push(InvalidAddon::new(candidate.id, e.to_string()));
                    }
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Parse task aborted");
            }
        }

        let mut outcome = std::mem::take(&mut *results.lock().await);
        outcome.skipped = skipped;

        info!(
            valid = outcome.addons.len(),
            invalid = outcome.invalid.len(),
            excluded = outcome.excluded.len(),
            skipped,
            "Parsing complete"
        );
        outcome
    }
}
