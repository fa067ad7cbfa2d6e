//! Wire shapes for the C2 calls that don't already have a type at home in
//! `labelforge-core` (spec §4.8 "image-prompts").

use labelforge_image::ImageSpec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePromptsResponse {
    pub expected_prompts: usize,
    pub prompts: Vec<ImageSpec>,
}

impl ImagePromptsResponse {
    pub const MAX_PROMPTS: usize = 5;

    /// `len(prompts) == expectedPrompts`, at most 5, distinct ids — a
    /// mismatch forces the C2 repair loop rather than silently proceeding
    /// (spec §4.8 "Tie-break/edge policies").
    pub fn validate_shape(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();

        if self.prompts.len() != self.expected_prompts {
            issues.push(format!(
                "expectedPrompts ({}) does not match len(prompts) ({})",
                self.expected_prompts,
                self.prompts.len()
            ));
        }
        if self.prompts.len() > Self::MAX_PROMPTS {
            issues.push(format!(
                "at most {} prompts allowed, got {}",
                Self::MAX_PROMPTS,
                self.prompts.len()
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Drops duplicate ids, keeping the first occurrence and stable order
    /// (spec §4.8 "on duplicate asset ids from the LLM, deduplicate keeping
    /// the first").
    pub fn deduped_prompts(&self) -> Vec<ImageSpec> {
        let mut seen = std::collections::HashSet::new();
        self.prompts
            .iter()
            .filter(|p| seen.insert(p.id.clone()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelforge_image::{Aspect, Purpose};

    fn prompt(id: &str) -> ImageSpec {
        ImageSpec {
            id: id.to_string(),
            purpose: Purpose::Background,
            prompt: "a vineyard at dusk".to_string(),
            negative_prompt: None,
            guidance: None,
            aspect: Aspect::FourThree,
        }
    }

    #[test]
    fn mismatched_expected_prompts_is_rejected() {
        let response = ImagePromptsResponse {
            expected_prompts: 2,
            prompts: vec![prompt("hero")],
        };
        assert!(response.validate_shape().is_err());
    }

    #[test]
    fn matching_count_within_limit_is_accepted() {
        let response = ImagePromptsResponse {
            expected_prompts: 1,
            prompts: vec![prompt("hero")],
        };
        assert!(response.validate_shape().is_ok());
    }

    #[test]
    fn duplicate_ids_are_deduped_keeping_first() {
        let response = ImagePromptsResponse {
            expected_prompts: 2,
            prompts: vec![prompt("hero"), prompt("hero")],
        };
        assert_eq!(response.deduped_prompts().len(), 1);
    }
}
