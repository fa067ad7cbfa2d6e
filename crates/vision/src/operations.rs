//! The vision refiner's closed edit-operation vocabulary (spec §4.6).
//! These are *semantic* edits — element ids here need not match the
//! document's actual ids; `labelforge-edits` resolves that gap.

use labelforge_core::Element;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypographyTarget {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypographyProperty {
    Family,
    Weight,
    Style,
    LetterSpacing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementProperty {
    Bounds,
    FontSize,
    Color,
    Text,
    Opacity,
    Rotation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditOperation {
    UpdatePalette {
        target: String,
        value: String,
    },
    UpdateTypography {
        target: TypographyTarget,
        property: TypographyProperty,
        value: String,
    },
    UpdateElement {
        element_id: String,
        property: ElementProperty,
        value: serde_json::Value,
    },
    AddElement {
        element: Element,
    },
    RemoveElement {
        element_id: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposeEditsResponse {
    pub operations: Vec<EditOperation>,
    pub reasoning: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl ProposeEditsResponse {
    /// Schema-level cap: at most 10 operations per refine iteration.
    pub const MAX_OPERATIONS: usize = 10;

    pub fn validate_shape(&self) -> Result<(), Vec<String>> {
        if self.operations.len() > Self::MAX_OPERATIONS {
            return Err(vec![format!(
                "expected at most {} operations, got {}",
                Self::MAX_OPERATIONS,
                self.operations.len()
            )]);
        }
        if let Some(confidence) = self.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(vec!["confidence must be within [0, 1]".to_string()]);
            }
        }
        Ok(())
    }
}
