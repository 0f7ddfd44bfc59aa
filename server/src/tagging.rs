//! Animal tagging engine: tag issuance and public verification.
//!
//! Issuing a tag mints a globally unique tag number, renders a scan code
//! pointing at the public verification page, persists both image
//! artifacts, then writes the tag record. Artifacts go first; if the
//! record insert fails they are removed again, so a persisted tag never
//! claims an artifact that is not there.

use crate::artifacts::ArtifactStore;
use fieldsport_core::error::{PlatformError, Result};
use fieldsport_core::store::{NewAnimalTag, PlatformStore};
use fieldsport_core::types::{AnimalTag, Field, ReportId, TagId, TagNumber, User};
use image::{DynamicImage, ImageFormat};
use qrcode::QrCode;
use std::io::Cursor;
use std::sync::Arc;

/// Parameters for issuing a tag against a hunt report.
#[derive(Debug, Clone)]
pub struct IssueTag {
    /// Parent hunt report
    pub report_id: ReportId,
    /// Species of the tagged animal
    pub species: String,
    /// Observed condition
    pub condition: String,
    /// Raw photo bytes, if a photo was captured
    pub photo: Option<Vec<u8>>,
    /// Physical tag number attached in the field, if different
    pub physical_tag: Option<String>,
    /// Disease information, if applicable
    pub disease: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
}

/// A verified tag with its linked hunter and field summaries, as served
/// to the unauthenticated verification surface.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifiedTag {
    /// The tag record
    pub tag: AnimalTag,
    /// The hunter who issued the tag
    pub hunter: User,
    /// Name of the field the animal was taken on
    pub field_name: String,
    /// Location of that field
    pub field_location: String,
}

/// Tag issuance and verification service.
pub struct TaggingService {
    store: Arc<dyn PlatformStore>,
    artifacts: Arc<dyn ArtifactStore>,
    public_base_url: String,
}

impl TaggingService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        store: Arc<dyn PlatformStore>,
        artifacts: Arc<dyn ArtifactStore>,
        public_base_url: String,
    ) -> Self {
        Self {
            store,
            artifacts,
            public_base_url,
        }
    }

    /// The verification URL a scan code resolves to.
    #[must_use]
    pub fn verification_url(&self, tag_number: &TagNumber) -> String {
        format!("{}/verify?tag={tag_number}", self.public_base_url)
    }

    /// Issues a tag for one harvested animal.
    ///
    /// # Errors
    ///
    /// `NotFound` when the report does not exist, `InvalidSequence` when
    /// the report recorded no harvested animals, `Persistence` on
    /// artifact or storage failure.
    #[tracing::instrument(skip(self, request), fields(report_id = %request.report_id))]
    pub async fn issue_tag(&self, request: IssueTag) -> Result<AnimalTag> {
        let report = self.store.get_report(request.report_id).await?;
        if report.animals_harvested == 0 {
            return Err(PlatformError::InvalidSequence(
                "cannot tag an animal on an empty-handed hunt report".to_string(),
            ));
        }

        let tag_number = TagNumber::mint();
        let scan_code_key = format!("scan_codes/{tag_number}.png");
        let scan_code_png = render_scan_code(&self.verification_url(&tag_number))?;
        self.artifacts.put(&scan_code_key, scan_code_png).await?;

        let photo_key = match request.photo {
            Some(bytes) => {
                let key = format!("animal_photos/{tag_number}.jpg");
                self.artifacts.put(&key, bytes).await?;
                Some(key)
            }
            None => None,
        };

        let new_tag = NewAnimalTag {
            id: TagId::new(),
            tag_number,
            report_id: report.id,
            hunter_id: report.hunter_id,
            field_id: report.field_id,
            species: request.species,
            condition: request.condition,
            photo_key: photo_key.clone(),
            scan_code_key: scan_code_key.clone(),
            physical_tag: request.physical_tag,
            disease: request.disease,
            notes: request.notes,
        };
        match self.store.create_animal_tag(new_tag).await {
            Ok(tag) => Ok(tag),
            Err(err) => {
                // The record did not land; take the artifacts back out so
                // nothing orphaned claims this tag number.
                let _ = self.artifacts.remove(&scan_code_key).await;
                if let Some(key) = &photo_key {
                    let _ = self.artifacts.remove(key).await;
                }
                Err(err)
            }
        }
    }

    /// Public verification lookup: the tag plus its hunter and field
    /// context. `Ok(None)` is a definitive not-found, distinguishable
    /// from a storage error.
    ///
    /// # Errors
    ///
    /// `Persistence` when storage is unavailable.
    pub async fn verify(&self, tag_number: &TagNumber) -> Result<Option<VerifiedTag>> {
        let Some(tag) = self.store.tag_by_number(tag_number).await? else {
            return Ok(None);
        };
        let hunter = self.store.get_user(tag.hunter_id).await?;
        let Field { name, location, .. } = self.store.get_field(tag.field_id).await?;
        Ok(Some(VerifiedTag {
            tag,
            hunter,
            field_name: name,
            field_location: location,
        }))
    }
}

/// Renders the scan code for a verification URL as a PNG.
fn render_scan_code(url: &str) -> Result<Vec<u8>> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| PlatformError::Persistence(format!("failed to encode scan code: {e}")))?;
    let image = code
        .render::<image::Luma<u8>>()
        .min_dimensions(200, 200)
        .build();

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| PlatformError::Persistence(format!("failed to render scan code: {e}")))?;
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn scan_code_renders_a_png() {
        let png = render_scan_code("http://localhost:8080/verify?tag=abc").unwrap();
        // PNG magic bytes
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n']);
    }
}
