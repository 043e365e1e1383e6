//! Enumerated configuration values.

use serde::{Deserialize, Serialize};

/// How per-matrix residuals are folded into the single early-stop signal.
///
/// The reduction is the only place where batch elements interact.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ResidualReduction {
    /// Stop once the worst matrix in the batch has converged.
    #[default]
    Max,
    /// Stop once the average residual has converged.
    Mean,
}

impl std::fmt::Display for ResidualReduction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Mean => write!(f, "mean"),
        }
    }
}

impl std::str::FromStr for ResidualReduction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "max" | "worst" => Ok(Self::Max),
            "mean" | "avg" | "average" => Ok(Self::Mean),
            _ => Err(format!(
                "Unknown residual reduction: '{s}'. Valid options: max, mean"
            )),
        }
    }
}

/// What the per-matrix residual `‖X − Y Y‖_F` is measured against.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ResidualScale {
    /// Divided by `‖X‖_F`, so one threshold fits inputs of any magnitude.
    #[default]
    Relative,
    /// Raw Frobenius norm, in the units of `X`.
    Absolute,
}

impl std::fmt::Display for ResidualScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relative => write!(f, "relative"),
            Self::Absolute => write!(f, "absolute"),
        }
    }
}

impl std::str::FromStr for ResidualScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relative" | "rel" => Ok(Self::Relative),
            "absolute" | "abs" => Ok(Self::Absolute),
            _ => Err(format!(
                "Unknown residual scale: '{s}'. Valid options: relative, absolute"
            )),
        }
    }
}
