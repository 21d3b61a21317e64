use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lane_core::assignment::{HungarianPairing, PairingAlgorithm};
use lane_core::directory::CityDirectory;
use lane_core::{CityRecord, DirectoryError};

/// Delegates to the Hungarian solver and counts how often it ran.
#[derive(Clone, Default)]
pub struct CountingPairing {
    pub calls: Arc<AtomicUsize>,
}

impl CountingPairing {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PairingAlgorithm for CountingPairing {
    fn assign(&self, scores: &[Vec<f64>]) -> Vec<(usize, usize)> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        HungarianPairing.assign(scores)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("directory unavailable: {0}")]
pub struct GatewayDown(pub &'static str);

/// Resolves base cities from `inner` but fails every radius query.
pub struct FailingRadiusDirectory<D> {
    pub inner: D,
}

impl<D: CityDirectory> CityDirectory for FailingRadiusDirectory<D> {
    fn find_by_name_state(
        &self,
        name: &str,
        state: &str,
    ) -> Result<Option<CityRecord>, DirectoryError> {
        self.inner.find_by_name_state(name, state)
    }

    fn find_within_radius(
        &self,
        _lat: f64,
        _lon: f64,
        _miles: f64,
    ) -> Result<Vec<CityRecord>, DirectoryError> {
        Err(Box::new(GatewayDown("replica lag")))
    }
}
