//! Per-model pricing and request cost estimation.
//!
//! Callers use [`estimate_cost`] to produce the projected cost handed to
//! the limiter before an AI call is made.

/// Pricing per million tokens for a model family (USD).
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    /// Cost per million prompt tokens.
    pub prompt: f64,
    /// Cost per million completion tokens.
    pub completion: f64,
}

/// Known model pricing table (USD per million tokens).
const PRICING_TABLE: &[(&str, ModelPricing)] = &[
    ("claude", ModelPricing { prompt: 3.0, completion: 15.0 }),
    ("gpt-4", ModelPricing { prompt: 30.0, completion: 60.0 }),
    ("gpt-3.5", ModelPricing { prompt: 0.5, completion: 1.5 }),
];

/// Get pricing for a model by name or alias.
///
/// Matches known model name substrings, so `"claude-3-sonnet"` resolves
/// via the `"claude"` entry.
pub fn model_pricing(model: &str) -> Option<ModelPricing> {
    let model_lower = model.to_lowercase();
    PRICING_TABLE
        .iter()
        .find(|(name, _)| model_lower.contains(name))
        .map(|(_, pricing)| *pricing)
}

/// Estimate cost in USD for a prospective request.
///
/// Returns `None` for models absent from the pricing table; callers
/// should treat that as "price unknown" and fall back to a conservative
/// estimate rather than zero.
pub fn estimate_cost(model: &str, prompt_tokens: u64, completion_tokens: u64) -> Option<f64> {
    let pricing = model_pricing(model)?;
    #[allow(clippy::cast_precision_loss)]
    let cost = (prompt_tokens as f64 * pricing.prompt
        + completion_tokens as f64 * pricing.completion)
        / 1_000_000.0;
    Some(cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_pricing_substring_match() {
        let pricing = model_pricing("claude-3-sonnet-20240229").unwrap();
        assert!((pricing.prompt - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_model_pricing_case_insensitive() {
        assert!(model_pricing("GPT-4-turbo").is_some());
    }

    #[test]
    fn test_estimate_cost_prompt_only() {
        // 1M prompt tokens on gpt-4 = $30.
        let cost = estimate_cost("gpt-4", 1_000_000, 0).unwrap();
        assert!((cost - 30.0).abs() < 0.001);
    }

    #[test]
    fn test_estimate_cost_mixed() {
        // 10K prompt + 5K completion on claude: 0.03 + 0.075 = 0.105.
        let cost = estimate_cost("claude", 10_000, 5_000).unwrap();
        assert!((cost - 0.105).abs() < 0.001);
    }

    #[test]
    fn test_unknown_model_returns_none() {
        assert!(model_pricing("palm-2").is_none());
        assert!(estimate_cost("palm-2", 1000, 1000).is_none());
    }
}
