// SPDX-License-Identifier: Apache-2.0

//! Probe engine configuration
//!
//! Configuration is small: which hardware tier to run and where completion
//! reports go. It can be deserialized (serde) as part of a host application's
//! config or read from the environment:
//!
//! - `HWPROBE_STRATEGY`: `auto` | `scalar` | `avx2` | `neon`
//! - `HWPROBE_DIAGNOSTICS`: `off` | `log` | `stdout`
//!
//! Building with the `disable-simd` feature makes `auto` resolve to `scalar`.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{ENV_DIAGNOSTICS, ENV_STRATEGY};
use crate::diagnostics::{LogObserver, NoopObserver, ProbeObserver, StdoutObserver};
use crate::types::{ProbeError, Result, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    /// Widest instruction set detected on the running CPU.
    #[default]
    Auto,
    Scalar,
    Avx2,
    Neon,
}

impl From<Strategy> for StrategyChoice {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Scalar => StrategyChoice::Scalar,
            Strategy::Avx2 => StrategyChoice::Avx2,
            Strategy::Neon => StrategyChoice::Neon,
        }
    }
}

impl FromStr for StrategyChoice {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(StrategyChoice::Auto),
            "scalar" => Ok(StrategyChoice::Scalar),
            "avx2" => Ok(StrategyChoice::Avx2),
            "neon" => Ok(StrategyChoice::Neon),
            other => Err(ProbeError::InvalidConfig(format!(
                "unknown strategy '{other}' (expected auto, scalar, avx2 or neon)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticsMode {
    Off,
    #[default]
    Log,
    Stdout,
}

impl DiagnosticsMode {
    pub fn observer(self) -> Box<dyn ProbeObserver> {
        match self {
            DiagnosticsMode::Off => Box::new(NoopObserver),
            DiagnosticsMode::Log => Box::new(LogObserver),
            DiagnosticsMode::Stdout => Box::new(StdoutObserver),
        }
    }
}

impl FromStr for DiagnosticsMode {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(DiagnosticsMode::Off),
            "log" => Ok(DiagnosticsMode::Log),
            "stdout" => Ok(DiagnosticsMode::Stdout),
            other => Err(ProbeError::InvalidConfig(format!(
                "unknown diagnostics mode '{other}' (expected off, log or stdout)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub strategy: StrategyChoice,
    pub diagnostics: DiagnosticsMode,
}

impl ProbeConfig {
    pub fn new(strategy: StrategyChoice, diagnostics: DiagnosticsMode) -> Self {
        Self {
            strategy,
            diagnostics,
        }
    }

    /// Read the configuration from the environment. Unset variables keep
    /// their defaults; set but unparseable ones are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ProbeConfig::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_STRATEGY) {
            config.strategy = value.parse()?;
        }
        if let Some(value) = lookup(ENV_DIAGNOSTICS) {
            config.diagnostics = value.parse()?;
        }
        Ok(config)
    }
}
