use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::params::{PARAM_COUNT, Param};
use crate::foundation::error::{DepthflowError, DepthflowResult};

/// An immutable set of parameter values, each within its declared bounds.
///
/// Serializes as a JSON object keyed by parameter name. Deserialization starts from the
/// defaults and rejects unknown names or out-of-range values.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(
    into = "BTreeMap<String, f64>",
    try_from = "BTreeMap<String, f64>"
)]
pub struct Config {
    values: [f64; PARAM_COUNT],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            values: Param::ALL.map(|p| p.spec().default),
        }
    }
}

impl Config {
    #[inline]
    pub fn get(&self, param: Param) -> f64 {
        self.values[param.index()]
    }

    /// Validated write; on error the previous value is kept.
    pub fn set(&mut self, param: Param, value: f64) -> DepthflowResult<()> {
        self.values[param.index()] = param.validate(value)?;
        Ok(())
    }

    pub fn set_by_name(&mut self, name: &str, value: f64) -> DepthflowResult<()> {
        self.set(Param::from_name(name)?, value)
    }

    /// Boolean view of a gate parameter (`>= 0.5`).
    #[inline]
    pub fn flag(&self, param: Param) -> bool {
        self.get(param) >= 0.5
    }

    pub fn iter(&self) -> impl Iterator<Item = (Param, f64)> + '_ {
        Param::ALL.into_iter().map(|p| (p, self.get(p)))
    }

    pub fn from_json(bytes: &[u8]) -> DepthflowResult<Self> {
        let map: BTreeMap<String, f64> = serde_json::from_slice(bytes)
            .map_err(|e| DepthflowError::config(format!("config json: {e}")))?;
        Self::try_from(map)
    }

    pub fn to_json_pretty(&self) -> DepthflowResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| anyhow::Error::new(e).into())
    }
}

impl From<Config> for BTreeMap<String, f64> {
    fn from(config: Config) -> Self {
        config
            .iter()
            .map(|(p, v)| (p.name().to_string(), v))
            .collect()
    }
}

impl TryFrom<BTreeMap<String, f64>> for Config {
    type Error = DepthflowError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut config = Config::default();
        for (name, value) in map {
            config.set_by_name(&name, value)?;
        }
        Ok(config)
    }
}

/// Shared home of the live parameter values.
///
/// Each parameter lives in its own atomic slot, so a write from the UI, the pointer path or
/// the loop scheduler is one indivisible scalar store. Readers take a [`Config`] snapshot.
#[derive(Debug)]
pub struct ConfigStore {
    slots: [AtomicU64; PARAM_COUNT],
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            slots: std::array::from_fn(|i| AtomicU64::new(config.values[i].to_bits())),
        }
    }

    #[inline]
    pub fn get(&self, param: Param) -> f64 {
        f64::from_bits(self.slots[param.index()].load(Ordering::Acquire))
    }

    /// Validated write; a rejected value leaves the slot untouched.
    pub fn set(&self, param: Param, value: f64) -> DepthflowResult<()> {
        let value = param.validate(value)?;
        self.slots[param.index()].store(value.to_bits(), Ordering::Release);
        Ok(())
    }

    pub fn set_by_name(&self, name: &str, value: f64) -> DepthflowResult<()> {
        self.set(Param::from_name(name)?, value)
    }

    /// Copy the current values. Each slot is read atomically; the set as a whole is not a
    /// transaction, matching the per-scalar write contract.
    pub fn snapshot(&self) -> Config {
        Config {
            values: std::array::from_fn(|i| f64::from_bits(self.slots[i].load(Ordering::Acquire))),
        }
    }

    /// Overwrite every slot from `config`.
    pub fn replace(&self, config: &Config) {
        for (slot, value) in self.slots.iter().zip(config.values) {
            slot.store(value.to_bits(), Ordering::Release);
        }
    }

    pub fn reset(&self) {
        self.replace(&Config::default());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/store.rs"]
mod tests;
