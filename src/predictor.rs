use crate::error::Result;
use crate::persistence::ModelStore;

/// Serves single-row predictions from the persisted model.
///
/// The artifact is read on every call, so a model saved by a concurrent
/// training run is picked up by the next request.
#[derive(Debug, Clone)]
pub struct Predictor {
    store: ModelStore,
}

impl Predictor {
    pub fn new(store: ModelStore) -> Self {
        Predictor { store }
    }

    pub fn predict(&self, values: &[f64]) -> Result<String> {
        let model = self.store.load()?;
        let label = model.predict_one(values)?;
        log::debug!("Predicted '{}' for {:?}", label, values);
        Ok(label)
    }
}
