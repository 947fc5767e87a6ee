//! JMA seismic intensity tokens ("1" through "7", optionally suffixed with + or -).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Offset applied for a `+` / `-` modifier. Previously tuned thresholds depend
/// on this exact value.
pub const MODIFIER_OFFSET: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
  Plus,
  Plain,
  Minus,
}

/// A validated intensity token: one digit 1-7 and at most one modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScaleToken {
  level: u8,
  modifier: Modifier,
}

impl ScaleToken {
  pub fn level(&self) -> u8 {
    self.level
  }

  pub fn modifier(&self) -> Modifier {
    self.modifier
  }

  /// Position on the ordered scale: "5-" = 4.7, "5" = 5.0, "5+" = 5.3.
  pub fn numeric(&self) -> f64 {
    let base = f64::from(self.level);
    match self.modifier {
      Modifier::Plus => base + MODIFIER_OFFSET,
      Modifier::Plain => base,
      Modifier::Minus => base - MODIFIER_OFFSET,
    }
  }

  pub fn at_least(&self, threshold: &ScaleToken) -> bool {
    self.numeric() >= threshold.numeric()
  }
}

impl FromStr for ScaleToken {
  type Err = EngineError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut chars = s.chars();

    let level = match chars.next() {
      None => return Err(EngineError::scale(s, "empty token")),
      Some(c) => c
        .to_digit(10)
        .ok_or_else(|| EngineError::scale(s, "must start with a digit"))?,
    };
    if !(1..=7).contains(&level) {
      return Err(EngineError::scale(s, "level must be between 1 and 7"));
    }

    let modifier = match chars.next() {
      None => Modifier::Plain,
      Some('+') => Modifier::Plus,
      Some('-') => Modifier::Minus,
      Some(_) => return Err(EngineError::scale(s, "modifier must be + or -")),
    };
    if chars.next().is_some() {
      return Err(EngineError::scale(s, "at most one modifier is allowed"));
    }

    Ok(Self {
      level: level as u8,
      modifier,
    })
  }
}

impl TryFrom<String> for ScaleToken {
  type Error = EngineError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<ScaleToken> for String {
  fn from(token: ScaleToken) -> Self {
    token.to_string()
  }
}

impl fmt::Display for ScaleToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let suffix = match self.modifier {
      Modifier::Plus => "+",
      Modifier::Plain => "",
      Modifier::Minus => "-",
    };
    write!(f, "{}{}", self.level, suffix)
  }
}

/// True if `value` is at or above `threshold` on the intensity scale.
///
/// A malformed token on either side is an error; callers treat that as
/// "undetermined" and must not raise an alert.
pub fn meets_or_exceeds(value: &str, threshold: &str) -> Result<bool, EngineError> {
  let value: ScaleToken = value.parse()?;
  let threshold: ScaleToken = threshold.parse()?;
  Ok(value.at_least(&threshold))
}
