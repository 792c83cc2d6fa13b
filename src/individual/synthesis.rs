//! Constant synthesis.
//!
//! Programs generated with the `CONSTANT-SYNTHESIS` terminal carry the placeholder
//! verbatim. After generation and mutation every occurrence is replaced, one at a
//! time, by an independently drawn value whose sign is uniform and whose magnitude
//! follows `Exponential(rate = 1)`.

use crate::rng::RandomNumberGenerator;
use crate::vocabulary::CONSTANT_SYNTHESIS_TOKEN;

/// Replaces every constant-synthesis placeholder in `text` with a fresh random constant.
///
/// Text without the placeholder is returned unchanged and consumes no randomness.
pub fn synthesize_constants(text: &str, rng: &mut RandomNumberGenerator) -> String {
    let mut pieces = text.split(CONSTANT_SYNTHESIS_TOKEN);
    let mut synthesized = String::with_capacity(text.len());
    if let Some(first) = pieces.next() {
        synthesized.push_str(first);
    }
    for piece in pieces {
        synthesized.push_str(&rng.signed_exponential().to_string());
        synthesized.push_str(piece);
    }
    synthesized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_without_placeholder_is_unchanged() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        assert_eq!(synthesize_constants("(+ X 1)", &mut rng), "(+ X 1)");
    }

    #[test]
    fn test_every_placeholder_is_replaced() {
        let mut rng = RandomNumberGenerator::from_seed(5);
        let text = "(+ CONSTANT-SYNTHESIS (* X CONSTANT-SYNTHESIS))";
        let synthesized = synthesize_constants(text, &mut rng);

        assert!(!synthesized.contains(CONSTANT_SYNTHESIS_TOKEN));
        let constants: Vec<f64> = synthesized
            .split(|c: char| c == '(' || c == ')' || c.is_whitespace())
            .filter_map(|token| token.parse::<f64>().ok())
            .collect();
        assert_eq!(constants.len(), 2);
        assert!(synthesized.starts_with("(+ "));
        assert!(synthesized.ends_with("))"));
    }

    #[test]
    fn test_bare_placeholder() {
        let mut rng = RandomNumberGenerator::from_seed(9);
        let synthesized = synthesize_constants("CONSTANT-SYNTHESIS", &mut rng);
        assert!(synthesized.parse::<f64>().is_ok());
    }

    #[test]
    fn test_same_seed_same_constants() {
        let text = "(- CONSTANT-SYNTHESIS CONSTANT-SYNTHESIS)";
        let a = synthesize_constants(text, &mut RandomNumberGenerator::from_seed(21));
        let b = synthesize_constants(text, &mut RandomNumberGenerator::from_seed(21));
        assert_eq!(a, b);
    }
}
