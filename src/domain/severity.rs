use std::fmt;

use serde::{Deserialize, Serialize};

pub const HIGH_THRESHOLD: f32 = 0.90;
pub const MEDIUM_THRESHOLD: f32 = 0.70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

impl SeverityTier {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Some(SeverityTier::Low),
            "medium" => Some(SeverityTier::Medium),
            "high" => Some(SeverityTier::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traduce la confianza del detector a un nivel. Se recorta a [0, 1]; NaN es `Low`.
pub fn classify(confidence: f32) -> SeverityTier {
    if confidence.is_nan() {
        return SeverityTier::Low;
    }
    let c = confidence.clamp(0.0, 1.0);
    if c >= HIGH_THRESHOLD {
        SeverityTier::High
    } else if c >= MEDIUM_THRESHOLD {
        SeverityTier::Medium
    } else {
        SeverityTier::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive_lower_bounds() {
        assert_eq!(classify(0.90), SeverityTier::High);
        assert_eq!(classify(0.8999), SeverityTier::Medium);
        assert_eq!(classify(0.70), SeverityTier::Medium);
        assert_eq!(classify(0.6999), SeverityTier::Low);
        assert_eq!(classify(0.0), SeverityTier::Low);
        assert_eq!(classify(1.0), SeverityTier::High);
    }

    #[test]
    fn every_confidence_lands_in_exactly_one_tier() {
        for i in 0..=1000 {
            let c = i as f32 / 1000.0;
            let expected = if c >= 0.9 {
                SeverityTier::High
            } else if c >= 0.7 {
                SeverityTier::Medium
            } else {
                SeverityTier::Low
            };
            assert_eq!(classify(c), expected, "confidence {c}");
        }
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(classify(1.7), SeverityTier::High);
        assert_eq!(classify(-0.3), SeverityTier::Low);
        assert_eq!(classify(f32::NAN), SeverityTier::Low);
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(SeverityTier::Low < SeverityTier::Medium);
        assert!(SeverityTier::Medium < SeverityTier::High);
        assert_eq!(SeverityTier::parse("HIGH"), Some(SeverityTier::High));
        assert_eq!(SeverityTier::parse("extreme"), None);
    }
}
