//! crates/stylo_core/src/validation.rs
//!
//! Normalization of free-form client values against the closed enumerations.
//!
//! The policy is permissive: an unrecognized enumeration value is replaced by
//! the field's default instead of being rejected. The image link is the only
//! field that must be correct as submitted.

use crate::domain::{
    BodyType, ClosedSet, ColorPreferences, FaceType, NewWardrobeItem, QuestionnaireAnswers,
    QuestionnaireProfile, SkinTone, WardrobeItemDraft,
};
use crate::ports::PortError;
use tracing::debug;

/// Schemes an image link may start with.
pub const IMAGE_URL_SCHEMES: [&str; 2] = ["https://", "http://"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid image URL: '{0}'")]
    InvalidImageUrl(String),
}

impl From<ValidationError> for PortError {
    fn from(e: ValidationError) -> Self {
        PortError::Invalid(e.to_string())
    }
}

/// Trims and lowercases `raw`, falling back to `T::default()` when it is not a member of `T`.
pub fn normalize_choice<T: ClosedSet>(raw: &str) -> T {
    let token = raw.trim().to_lowercase();
    T::parse(&token).unwrap_or_else(|| {
        let fallback = T::default();
        debug!("Unrecognized value '{}', using '{}'", raw, fallback.as_str());
        fallback
    })
}

/// Trimmed, lowercased colors with blank entries dropped. Duplicates are kept.
pub fn normalize_colors(raw: &ColorPreferences) -> Vec<String> {
    let colors: &[String] = match raw {
        ColorPreferences::One(color) => std::slice::from_ref(color),
        ColorPreferences::Many(colors) => colors,
    };
    colors
        .iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}

pub fn validate_image_url(raw: &str) -> Result<String, ValidationError> {
    let url = raw.trim();
    let lowered = url.to_ascii_lowercase();
    let has_scheme = IMAGE_URL_SCHEMES
        .iter()
        .any(|s| lowered.starts_with(s) && url.len() > s.len());
    if has_scheme {
        Ok(url.to_string())
    } else {
        Err(ValidationError::InvalidImageUrl(raw.to_string()))
    }
}

/// Normalizes a wardrobe submission. Fails only on a malformed image link.
pub fn validate_wardrobe_item(draft: WardrobeItemDraft) -> Result<NewWardrobeItem, ValidationError> {
    let image_url = validate_image_url(&draft.image_url)?;
    Ok(NewWardrobeItem {
        garment_type: normalize_choice(&draft.garment_type),
        nature: normalize_choice(&draft.nature),
        color: draft.color.trim().to_lowercase(),
        image_url,
        material: draft.material.trim().to_string(),
        brand: draft.brand.trim().to_string(),
        size: draft.size.trim().to_string(),
        user_id: draft.user_id,
    })
}

/// Normalizes questionnaire answers into a profile. Never fails.
pub fn normalize_questionnaire(answers: QuestionnaireAnswers) -> QuestionnaireProfile {
    QuestionnaireProfile {
        body_type: normalize_choice::<BodyType>(&answers.body_type),
        face_type: normalize_choice::<FaceType>(&answers.face_type),
        skin_tone: normalize_choice::<SkinTone>(&answers.skin_tone),
        color_preferences: normalize_colors(&answers.color_preferences),
        gender: answers.gender.trim().to_string(),
        age: answers.age.trim().to_string(),
        hair_style: answers.hair_style.trim().to_string(),
        favorite_brand: answers.favorite_brand.trim().to_string(),
        nationality: answers.nationality.trim().to_string(),
        favorite_accessories: answers.favorite_accessories.trim().to_string(),
        favorite_style: answers.favorite_style.trim().to_string(),
        occupation: answers.occupation.trim().to_string(),
        user_id: answers.user_id,
    }
}
