use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_timer::Delay;
use thiserror::Error;

use super::field::FormData;
use crate::config::FormConfig;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SubmitError {
    #[error("simulated submission failure")]
    Simulated,
    #[error("submission rejected: {0}")]
    Rejected(String),
}

pub type BoxedSubmitFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SubmitError>> + Send + 'a>>;

/// Delivers captured form data somewhere. The only fallible step of a
/// submit.
pub trait Submitter: Send + Sync {
    fn submit<'a>(&'a self, data: &'a FormData) -> BoxedSubmitFuture<'a>;
}

impl<F> Submitter for F
where
    F: Fn(&FormData) -> BoxedSubmitFuture<'static> + Send + Sync,
{
    fn submit<'a>(&'a self, data: &'a FormData) -> BoxedSubmitFuture<'a> {
        (self)(data)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SimulatedOutcome {
    #[default]
    Succeed,
    Fail,
}

/// Stand-in for a delivery backend: waits, logs the data, then resolves.
#[derive(Clone, Debug)]
pub struct SimulatedSubmitter {
    latency: Duration,
    outcome: SimulatedOutcome,
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

impl SimulatedSubmitter {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            outcome: SimulatedOutcome::Succeed,
        }
    }

    /// Uses the configured `submit_latency_ms`.
    pub fn from_config(config: &FormConfig) -> Self {
        Self::new(config.submit_latency())
    }

    pub fn outcome(mut self, outcome: SimulatedOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Submitter for SimulatedSubmitter {
    fn submit<'a>(&'a self, data: &'a FormData) -> BoxedSubmitFuture<'a> {
        Box::pin(async move {
            if !self.latency.is_zero() {
                Delay::new(self.latency).await;
            }
            tracing::debug!(fields = data.len(), ?data, "simulated form delivery");
            match self.outcome {
                SimulatedOutcome::Succeed => Ok(()),
                SimulatedOutcome::Fail => Err(SubmitError::Simulated),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FolioConfig;
    use crate::form::{Field, FieldKind};
    use futures::executor::block_on;

    fn sample() -> FormData {
        FormData::from_fields(&[Field::new("email", FieldKind::Email, "a@b.co")])
    }

    #[test]
    fn simulated_submitter_waits_for_latency() {
        let submitter = SimulatedSubmitter::new(Duration::from_millis(20));
        let started = std::time::Instant::now();
        assert_eq!(block_on(submitter.submit(&sample())), Ok(()));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn latency_comes_from_config() {
        let config = FolioConfig::from_toml_str("[form]\nsubmit_latency_ms = 15")
            .expect("config overlay");
        let submitter = SimulatedSubmitter::from_config(&config.form);
        assert_eq!(submitter.latency(), Duration::from_millis(15));

        let defaults = FolioConfig::embedded().expect("embedded config");
        assert_eq!(
            SimulatedSubmitter::from_config(&defaults.form).latency(),
            SimulatedSubmitter::default().latency()
        );
    }

    #[test]
    fn simulated_submitter_can_fail() {
        let submitter = SimulatedSubmitter::new(Duration::ZERO).outcome(SimulatedOutcome::Fail);
        assert_eq!(
            block_on(submitter.submit(&sample())),
            Err(SubmitError::Simulated)
        );
    }

    #[test]
    fn closures_act_as_submitters() {
        let submitter = |data: &FormData| -> BoxedSubmitFuture<'static> {
            let email = data.get("email").map(str::to_owned);
            Box::pin(async move {
                match email {
                    Some(email) if email.ends_with(".co") => Ok(()),
                    _ => Err(SubmitError::Rejected("unsupported domain".to_string())),
                }
            })
        };
        assert_eq!(block_on(submitter.submit(&sample())), Ok(()));
    }
}
