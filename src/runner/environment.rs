//! Environment composition for child processes

use crate::precision::MpfrRange;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Variable naming the simulator's own configuration file
pub const SIM_CONFIG_PATH: &str = "SIM_CONFIG_PATH";
pub const VF_SIGNIFICAND: &str = "VF_SIGNIFICAND";
pub const VF_EXPONENT_MIN: &str = "VF_EXPONENT_MIN";
pub const VF_EXPONENT_MAX: &str = "VF_EXPONENT_MAX";

/// A process environment, ordered by variable name
pub type Environment = BTreeMap<String, String>;

/// Returns `base` with every override added or replaced. `base` is untouched.
pub fn build_environment<'a, I>(base: &Environment, overrides: I) -> Environment
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut env = base.clone();
    for (key, value) in overrides {
        env.insert(key.clone(), value.clone());
    }
    env
}

/// Snapshot of the current process environment.
///
/// Variables that are not valid unicode are left out.
pub fn capture() -> Environment {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// What the simulator needs to find its configuration and calibrate its
/// variable-precision float type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorEnvironment {
    pub config_path: PathBuf,
    pub precision: MpfrRange,
}

impl SimulatorEnvironment {
    pub fn new(config_path: PathBuf, precision: MpfrRange) -> Self {
        Self {
            config_path,
            precision,
        }
    }

    /// The variables injected into every simulator invocation
    pub fn overrides(&self) -> Environment {
        let mut vars = Environment::new();
        vars.insert(
            SIM_CONFIG_PATH.to_string(),
            self.config_path.display().to_string(),
        );
        vars.insert(
            VF_SIGNIFICAND.to_string(),
            self.precision.significand.to_string(),
        );
        vars.insert(
            VF_EXPONENT_MIN.to_string(),
            self.precision.exponent_min.to_string(),
        );
        vars.insert(
            VF_EXPONENT_MAX.to_string(),
            self.precision.exponent_max.to_string(),
        );
        vars
    }

    /// A fresh environment for one simulator invocation
    pub fn apply(&self, base: &Environment) -> Environment {
        build_environment(base, &self.overrides())
    }
}
