use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LabelError;

/// The label style family requested by the customer. Closed set — drives
/// both the design-scheme prompt and the vision refiner's tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Classic,
    Modern,
    Elegant,
    Funky,
}

/// An immutable wine-label submission, as accepted by the job dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub producer_name: String,
    pub wine_name: String,
    pub vintage: String,
    pub variety: String,
    pub region: String,
    pub appellation: String,
    pub style: Style,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a submission; `id` and
/// `created_at` are assigned by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub producer_name: String,
    pub wine_name: String,
    pub vintage: String,
    pub variety: String,
    pub region: String,
    pub appellation: String,
    pub style: Style,
}

impl SubmissionRequest {
    /// Validates the invariants from spec §3: all fields non-empty, vintage
    /// matches `^\d{4}$`. `style` is already constrained by the closed enum.
    pub fn validate(&self) -> Result<(), LabelError> {
        let mut issues = Vec::new();

        if self.producer_name.trim().is_empty() {
            issues.push("producerName must not be empty");
        }
        if self.wine_name.trim().is_empty() {
            issues.push("wineName must not be empty");
        }
        if self.variety.trim().is_empty() {
            issues.push("variety must not be empty");
        }
        if self.region.trim().is_empty() {
            issues.push("region must not be empty");
        }
        if self.appellation.trim().is_empty() {
            issues.push("appellation must not be empty");
        }
        if !is_four_digit_year(&self.vintage) {
            issues.push("vintage must match ^\\d{4}$");
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(LabelError::Validation(issues.join("; ")))
        }
    }

    pub fn into_submission(self, id: Uuid, created_at: DateTime<Utc>) -> Submission {
        Submission {
            id,
            producer_name: self.producer_name,
            wine_name: self.wine_name,
            vintage: self.vintage,
            variety: self.variety,
            region: self.region,
            appellation: self.appellation,
            style: self.style,
            created_at,
        }
    }
}

fn is_four_digit_year(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SubmissionRequest {
        SubmissionRequest {
            producer_name: "Ch\u{e2}teau Test".to_string(),
            wine_name: "Grand Cru".to_string(),
            vintage: "2020".to_string(),
            variety: "Cabernet Sauvignon".to_string(),
            region: "Bordeaux".to_string(),
            appellation: "M\u{e9}doc".to_string(),
            style: Style::Classic,
        }
    }

    #[test]
    fn accepts_well_formed_submission() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn rejects_empty_field() {
        let mut req = valid_request();
        req.producer_name = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_non_four_digit_vintage() {
        let mut req = valid_request();
        req.vintage = "20-20".to_string();
        assert!(req.validate().is_err());

        req.vintage = "999".to_string();
        assert!(req.validate().is_err());

        req.vintage = "20201".to_string();
        assert!(req.validate().is_err());
    }
}
