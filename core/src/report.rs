//! Hunt report inputs and validation.

use crate::error::{PlatformError, Result};
use crate::types::{AnimalDetail, FieldId, HarvestEntry, SessionId, UserId};

/// Parameters for filing a hunt report against an active session.
#[derive(Clone, Debug, PartialEq)]
pub struct NewHuntReport {
    /// Session being reported (must be active and unreported)
    pub session_id: SessionId,
    /// Field the hunt took place on
    pub field_id: FieldId,
    /// Reporting hunter
    pub hunter_id: UserId,
    /// Total animals harvested (0 is a valid empty-handed hunt)
    pub animals_harvested: u32,
    /// Per-species quantities, drives quota depletion
    pub species_harvested: Vec<HarvestEntry>,
    /// Per-animal structured detail
    pub animals: Vec<AnimalDetail>,
    /// Free-text remarks about the ground itself
    pub ground_remarks: Option<String>,
    /// Weather during the hunt
    pub weather_conditions: Option<String>,
    /// Hours spent in the field
    pub time_spent_hours: Option<f32>,
    /// General notes
    pub notes: Option<String>,
    /// Review rating, 1-5, may also be added later
    pub review_rating: Option<u8>,
    /// Review text, may also be added later
    pub review_text: Option<String>,
}

impl NewHuntReport {
    /// Validates request-level constraints before any storage work.
    ///
    /// # Errors
    ///
    /// [`PlatformError::InvalidInput`] when a rating is out of range or
    /// a harvest entry carries a zero quantity.
    pub fn validate(&self) -> Result<()> {
        if let Some(rating) = self.review_rating {
            validate_rating(rating)?;
        }
        if self.species_harvested.iter().any(|e| e.quantity == 0) {
            return Err(PlatformError::InvalidInput(
                "harvest entries must have a non-zero quantity".to_string(),
            ));
        }
        Ok(())
    }
}

/// Review edits applied to an existing report. Review fields stay
/// editable by the report owner and administrators; harvest data does
/// not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReviewUpdate {
    /// New rating, 1-5
    pub rating: Option<u8>,
    /// New review text
    pub text: Option<String>,
}

impl ReviewUpdate {
    /// Validates the edit.
    ///
    /// # Errors
    ///
    /// [`PlatformError::InvalidInput`] when the rating is out of range
    /// or the update changes nothing.
    pub fn validate(&self) -> Result<()> {
        if self.rating.is_none() && self.text.is_none() {
            return Err(PlatformError::InvalidInput(
                "a review update must set a rating or a text".to_string(),
            ));
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        Ok(())
    }
}

fn validate_rating(rating: u8) -> Result<()> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(PlatformError::InvalidInput(format!(
            "review rating must be between 1 and 5, got {rating}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> NewHuntReport {
        NewHuntReport {
            session_id: SessionId::new(),
            field_id: FieldId::new(),
            hunter_id: UserId::new(),
            animals_harvested: 0,
            species_harvested: Vec::new(),
            animals: Vec::new(),
            ground_remarks: None,
            weather_conditions: None,
            time_spent_hours: None,
            notes: None,
            review_rating: None,
            review_text: None,
        }
    }

    #[test]
    fn empty_handed_report_is_valid() {
        assert!(report().validate().is_ok());
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let mut r = report();
        r.review_rating = Some(6);
        assert!(matches!(r.validate(), Err(PlatformError::InvalidInput(_))));
        r.review_rating = Some(0);
        assert!(matches!(r.validate(), Err(PlatformError::InvalidInput(_))));
        r.review_rating = Some(5);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn zero_quantity_harvest_entry_is_rejected() {
        let mut r = report();
        r.species_harvested.push(HarvestEntry {
            species: "Teal".to_string(),
            quantity: 0,
        });
        assert!(matches!(r.validate(), Err(PlatformError::InvalidInput(_))));
    }

    #[test]
    fn empty_review_update_is_rejected() {
        assert!(ReviewUpdate::default().validate().is_err());
        let update = ReviewUpdate {
            rating: Some(4),
            text: None,
        };
        assert!(update.validate().is_ok());
    }
}
