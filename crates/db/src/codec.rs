//! String encodings for the enum columns. `Stage` already carries
//! `as_str()`; the rest are narrow enough that a local match is clearer
//! than adding `FromStr` impls to `labelforge-core` just for this crate.

use labelforge_core::{GenerationStatus, LabelError, LabelResult, Stage, StepStatus};

pub fn status_to_str(status: GenerationStatus) -> &'static str {
    match status {
        GenerationStatus::Pending => "pending",
        GenerationStatus::Processing => "processing",
        GenerationStatus::Completed => "completed",
        GenerationStatus::Failed => "failed",
    }
}

pub fn status_from_str(s: &str) -> LabelResult<GenerationStatus> {
    match s {
        "pending" => Ok(GenerationStatus::Pending),
        "processing" => Ok(GenerationStatus::Processing),
        "completed" => Ok(GenerationStatus::Completed),
        "failed" => Ok(GenerationStatus::Failed),
        other => Err(LabelError::Database(format!("unknown generation status: {other}"))),
    }
}

pub fn step_status_to_str(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Pending => "pending",
        StepStatus::Processing => "processing",
        StepStatus::Completed => "completed",
        StepStatus::Failed => "failed",
    }
}

pub fn step_status_from_str(s: &str) -> LabelResult<StepStatus> {
    match s {
        "pending" => Ok(StepStatus::Pending),
        "processing" => Ok(StepStatus::Processing),
        "completed" => Ok(StepStatus::Completed),
        "failed" => Ok(StepStatus::Failed),
        other => Err(LabelError::Database(format!("unknown step status: {other}"))),
    }
}

pub fn stage_from_str(s: &str) -> LabelResult<Stage> {
    Stage::ORDER
        .iter()
        .copied()
        .find(|stage| stage.as_str() == s)
        .ok_or_else(|| LabelError::Database(format!("unknown stage: {s}")))
}

pub fn style_to_str(style: labelforge_core::Style) -> &'static str {
    match style {
        labelforge_core::Style::Classic => "classic",
        labelforge_core::Style::Modern => "modern",
        labelforge_core::Style::Elegant => "elegant",
        labelforge_core::Style::Funky => "funky",
    }
}

pub fn style_from_str(s: &str) -> LabelResult<labelforge_core::Style> {
    match s {
        "classic" => Ok(labelforge_core::Style::Classic),
        "modern" => Ok(labelforge_core::Style::Modern),
        "elegant" => Ok(labelforge_core::Style::Elegant),
        "funky" => Ok(labelforge_core::Style::Funky),
        other => Err(LabelError::Database(format!("unknown style: {other}"))),
    }
}

pub fn format_to_str(format: labelforge_core::AssetFormat) -> &'static str {
    match format {
        labelforge_core::AssetFormat::Png => "png",
        labelforge_core::AssetFormat::Jpg => "jpg",
        labelforge_core::AssetFormat::Webp => "webp",
    }
}

pub fn format_from_str(s: &str) -> LabelResult<labelforge_core::AssetFormat> {
    match s {
        "png" => Ok(labelforge_core::AssetFormat::Png),
        "jpg" => Ok(labelforge_core::AssetFormat::Jpg),
        "webp" => Ok(labelforge_core::AssetFormat::Webp),
        other => Err(LabelError::Database(format!("unknown asset format: {other}"))),
    }
}
