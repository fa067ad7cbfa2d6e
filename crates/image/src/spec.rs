//! Request/response types for the image adapter (spec §4.3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Background,
    Foreground,
    Decoration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aspect {
    #[serde(rename = "1:1")]
    OneOne,
    #[serde(rename = "3:2")]
    ThreeTwo,
    #[serde(rename = "4:3")]
    FourThree,
    #[serde(rename = "16:9")]
    SixteenNine,
    #[serde(rename = "2:3")]
    TwoThree,
    #[serde(rename = "3:4")]
    ThreeFour,
}

impl Aspect {
    /// Default pixel dimensions for mock/deterministic generation.
    pub fn default_dimensions(self) -> (u32, u32) {
        match self {
            Aspect::OneOne => (1024, 1024),
            Aspect::ThreeTwo => (1200, 800),
            Aspect::FourThree => (1200, 900),
            Aspect::SixteenNine => (1280, 720),
            Aspect::TwoThree => (800, 1200),
            Aspect::ThreeFour => (900, 1200),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSpec {
    pub id: String,
    pub purpose: Purpose,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<f32>,
    pub aspect: Aspect,
}

impl ImageSpec {
    /// Clamps `guidance` into the spec's `[1, 20]` range if present.
    pub fn clamped_guidance(&self) -> Option<f32> {
        self.guidance.map(|g| g.clamp(1.0, 20.0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMeta {
    pub model: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ImageOutput {
    pub bytes: Vec<u8>,
    pub meta: ImageMeta,
}
