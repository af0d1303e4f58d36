//! Core types for QARE
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Provides fundamental type aliases and validated wrapper types
//! used throughout the QARE system.

use crate::error::{QareError, QareResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed, qubit 0 is the most significant bit)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

/// Rotation angle in radians
/// Gantree: Angle // pub type Angle = f64
pub type Angle = f64;

/// Measurement counts: bitstring -> count
/// Gantree: Counts // pub type Counts = HashMap<String, u64>
pub type Counts = HashMap<String, u64>;

// ============================================================================
// Probability (Validated Wrapper)
// ============================================================================

/// Probability value in range [0, 1]
/// Gantree: Probability // 범위 검증 구조체
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Probability(f64);

impl Probability {
    /// Create a new Probability with validation
    /// Gantree: new(f64) -> Result<Self> // 생성+검증
    pub fn new(value: f64) -> QareResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(QareError::InvalidProbability(value));
        }
        Ok(Self(value))
    }

    /// Create by clipping into [0, 1]; NaN maps to zero
    pub fn clipped(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Get the probability value
    /// Gantree: value() -> f64 // 값 반환
    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Get the complement (1 - p)
    /// Gantree: complement() -> f64 // 1-p
    #[inline]
    pub fn complement(&self) -> f64 {
        1.0 - self.0
    }

    /// True at exactly 0 or exactly 1
    pub fn is_degenerate(&self) -> bool {
        self.0 == 0.0 || self.0 == 1.0
    }

    /// Zero probability
    pub const ZERO: Self = Self(0.0);

    /// Certainty (p = 1)
    pub const ONE: Self = Self(1.0);

    /// Half probability
    pub const HALF: Self = Self(0.5);
}

impl Default for Probability {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl TryFrom<f64> for Probability {
    type Error = QareError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// ============================================================================
// Bitstring
// ============================================================================

/// Classical bits read out of a register, most significant first
/// Gantree: Bitstring // 비트열 타입
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bitstring {
    bits: Vec<bool>,
}

impl Bitstring {
    /// Create from a vector of bools
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Create from string (e.g., "0110")
    /// Gantree: parse(s) -> Self // 파싱
    pub fn parse(s: &str) -> QareResult<Self> {
        let bits: Result<Vec<bool>, _> = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(QareError::config(format!("invalid bitstring '{}'", s))),
            })
            .collect();
        Ok(Self { bits: bits? })
    }

    /// Big-endian bits of `index` in a field of `width` bits
    pub fn from_index(index: usize, width: usize) -> Self {
        let bits = (0..width)
            .map(|k| (index >> (width - 1 - k)) & 1 == 1)
            .collect();
        Self { bits }
    }

    /// Get the number of bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Count number of 1s (Hamming weight)
    pub fn popcount(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Get bit at position (0 = most significant)
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Borrow the raw bits
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Convert to usize, first bit most significant
    /// Gantree: to_usize() -> usize // 정수 변환
    pub fn to_usize(&self) -> usize {
        self.bits
            .iter()
            .fold(0usize, |acc, &b| (acc << 1) | usize::from(b))
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bits {
            write!(f, "{}", if b { '1' } else { '0' })?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_valid() {
        assert!(Probability::new(0.0).is_ok());
        assert!(Probability::new(0.5).is_ok());
        assert!(Probability::new(1.0).is_ok());
    }

    #[test]
    fn test_probability_invalid() {
        assert!(Probability::new(-0.1).is_err());
        assert!(Probability::new(1.1).is_err());
    }

    #[test]
    fn test_probability_clipped() {
        assert_eq!(Probability::clipped(1.2).value(), 1.0);
        assert_eq!(Probability::clipped(-0.3).value(), 0.0);
        assert_eq!(Probability::clipped(f64::NAN).value(), 0.0);
        assert!(Probability::ONE.is_degenerate());
        assert!(!Probability::HALF.is_degenerate());
    }

    #[test]
    fn test_probability_complement() {
        let p = Probability::new(0.3).unwrap();
        assert!((p.complement() - 0.7).abs() < 1e-10);
    }

    #[test]
    fn test_bitstring_index_roundtrip() {
        let bs = Bitstring::from_index(0b1011, 5);
        assert_eq!(bs.to_string(), "01011");
        assert_eq!(bs.to_usize(), 11);
        assert_eq!(bs.get(0), Some(false));
        assert_eq!(bs.popcount(), 3);
    }

    #[test]
    fn test_bitstring_parse() {
        let bs = Bitstring::parse("110").unwrap();
        assert_eq!(bs.to_usize(), 6);
        assert!(Bitstring::parse("12").is_err());
    }
}
