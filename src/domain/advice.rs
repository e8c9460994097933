use super::detection::Label;
use super::severity::SeverityTier;

pub const FALLBACK_ADVICE: &str = "Keep an eye on the bird and watch its behaviour.";

/// Consejo que se muestra al granjero para cada par (etiqueta, nivel).
pub fn advise(label: Label, tier: SeverityTier) -> &'static str {
    match (label, tier) {
        (Label::Sick, SeverityTier::Low) => {
            "The bird looks slightly unwell. Give it a quiet spot and watch it for an hour. \
             Check ventilation and feed."
        }
        (Label::Sick, SeverityTier::Medium) => {
            "The bird is not behaving normally. Isolate it temporarily and check whether it \
             moves and eats. Keep a close eye on it during the day."
        }
        (Label::Sick, SeverityTier::High) => {
            "The bird shows clear symptoms. Isolate it immediately, provide good ventilation \
             and feed, and consult a veterinarian if it does not improve."
        }
        (Label::Dead, SeverityTier::Low) => {
            "The bird is barely moving, but it is too early to tell. Try to stimulate it or \
             keep watching for a while."
        }
        (Label::Dead, SeverityTier::Medium) => {
            "There are strong signs the bird is not alive. Separate it from the flock for now \
             and watch for any change."
        }
        (Label::Dead, SeverityTier::High) => {
            "The bird is most likely dead. Remove it quickly and dispose of it hygienically. \
             Clean the spot and check the rest of the flock."
        }
        (Label::Other, _) => FALLBACK_ADVICE,
    }
}

/// Búsqueda por nombre para los bordes, donde etiqueta y nivel llegan como texto.
pub fn advise_named(label: &str, tier: &str) -> &'static str {
    match SeverityTier::parse(tier) {
        Some(tier) => advise(Label::parse(label), tier),
        None => FALLBACK_ADVICE,
    }
}
