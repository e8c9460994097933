use serde::Serialize;

use super::advice::advise;
use super::detection::{Label, Point};
use super::severity::{classify, SeverityTier};

/// Detección aceptada (enferma o muerta), lista para enviar al granjero.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub label: Label,
    pub confidence: f32,
    pub tier: SeverityTier,
    pub center: Point,
    pub advice: &'static str,
}

impl Alert {
    pub fn new(label: Label, confidence: f32, center: Point) -> Self {
        let tier = classify(confidence);
        Self {
            label,
            confidence,
            tier,
            center,
            advice: advise(label, tier),
        }
    }

    pub fn message(&self) -> String {
        format!(
            "🚨 Detected condition: {} (confidence: {:.2})\n📝 Advice: {}",
            self.label, self.confidence, self.advice
        )
    }
}
