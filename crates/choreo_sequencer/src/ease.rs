// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves, named the way the tween library names them
//! (`"none"`, `"power3.out"`, `"power1.inOut"`).

use crate::error::ChoreoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which end of the curve is eased
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EaseKind {
    /// Slow start
    In,
    /// Slow finish
    Out,
    /// Slow start and finish
    InOut,
}

/// An easing curve mapping linear progress to eased progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ease {
    /// No easing (`"none"`)
    Linear,
    /// Polynomial ease of order `degree + 1` (`power1` is quadratic)
    Power {
        /// 1..=4
        degree: u8,
        /// Eased end
        kind: EaseKind,
    },
}

impl Default for Ease {
    fn default() -> Self {
        Ease::Power {
            degree: 1,
            kind: EaseKind::Out,
        }
    }
}

impl Ease {
    /// Shorthand for `powerN.out`
    pub const fn out(degree: u8) -> Self {
        Ease::Power {
            degree,
            kind: EaseKind::Out,
        }
    }

    /// Shorthand for `powerN.in`
    pub const fn ease_in(degree: u8) -> Self {
        Ease::Power {
            degree,
            kind: EaseKind::In,
        }
    }

    /// Shorthand for `powerN.inOut`
    pub const fn in_out(degree: u8) -> Self {
        Ease::Power {
            degree,
            kind: EaseKind::InOut,
        }
    }

    /// Map linear progress to eased progress. Input is clamped to [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power { degree, kind } => {
                let exp = i32::from(degree) + 1;
                match kind {
                    EaseKind::In => t.powi(exp),
                    EaseKind::Out => 1.0 - (1.0 - t).powi(exp),
                    EaseKind::InOut => {
                        if t < 0.5 {
                            0.5 * (2.0 * t).powi(exp)
                        } else {
                            1.0 - 0.5 * (2.0 - 2.0 * t).powi(exp)
                        }
                    }
                }
            }
        }
    }
}

impl FromStr for Ease {
    type Err = ChoreoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name == "none" || name == "linear" {
            return Ok(Ease::Linear);
        }

        let (family, kind) = match name.split_once('.') {
            Some((family, "in")) => (family, EaseKind::In),
            Some((family, "out")) => (family, EaseKind::Out),
            Some((family, "inOut")) => (family, EaseKind::InOut),
            Some(_) => return Err(ChoreoError::UnknownEase(s.to_string())),
            None => (name, EaseKind::Out),
        };

        let degree = family
            .strip_prefix("power")
            .and_then(|d| d.parse::<u8>().ok())
            .filter(|d| (1..=4).contains(d))
            .ok_or_else(|| ChoreoError::UnknownEase(s.to_string()))?;

        Ok(Ease::Power { degree, kind })
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ease::Linear => f.write_str("none"),
            Ease::Power { degree, kind } => {
                let suffix = match kind {
                    EaseKind::In => "in",
                    EaseKind::Out => "out",
                    EaseKind::InOut => "inOut",
                };
                write!(f, "power{degree}.{suffix}")
            }
        }
    }
}

impl TryFrom<String> for Ease {
    type Error = ChoreoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ease> for String {
    fn from(ease: Ease) -> Self {
        ease.to_string()
    }
}
