use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generation parameters bound to a run. `extra` is a narrow forward-compat
/// bag (per-provider knobs the core model doesn't know about yet) — kept as
/// a `BTreeMap` so its canonical encoding for `RunID` hashing does not
/// depend on insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Params {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub seed: Option<u64>,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_compose() {
        let params = Params::new().with_temperature(0.2).with_seed(7);
        assert_eq!(params.temperature, Some(0.2));
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.max_tokens, None);
    }
}
