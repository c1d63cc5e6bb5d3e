//! crates/stylo_core/src/prompts.rs
//!
//! Renders the text prompts sent to the language model. Every function here
//! is pure: identical inputs always produce identical strings.

use crate::domain::{ClosedSet, QuestionnaireProfile, StylingView, WardrobeItem};
use serde::Serialize;
use tracing::warn;

const NOT_SPECIFIED: &str = "Not specified";

const VOICE_TEMPLATE: &str = r#"You are a friendly fashion assistant. The user said: "{user_text}"

Provide a helpful, conversational response about fashion advice, outfit suggestions, or style tips.
Keep your response:
- Under 100 words
- Friendly and encouraging
- Specific and actionable
- Relevant to their question

If they're asking for outfit suggestions, consider:
- Occasion appropriateness
- Seasonal factors
- General style principles
- Color coordination tips"#;

/// Serializes `value` as JSON. These are plain data structs, so failure only gets a warning and `null`.
pub fn render_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.unwrap_or_else(|e| {
        warn!("Failed to serialize prompt context: {}", e);
        "null".to_string()
    })
}

/// The outfit recommendation prompt: three outfit categories, answered as JSON.
///
/// The model's answer is not parsed; callers forward the raw text.
pub fn build_recommendation_prompt(
    profile: Option<&QuestionnaireProfile>,
    wardrobe: &[WardrobeItem],
) -> String {
    let body_type = profile.map_or(NOT_SPECIFIED, |p| p.body_type.as_str());
    let face_type = profile.map_or(NOT_SPECIFIED, |p| p.face_type.as_str());
    let skin_tone = profile.map_or(NOT_SPECIFIED, |p| p.skin_tone.as_str());
    let style = profile
        .map(|p| p.favorite_style.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(NOT_SPECIFIED);
    let colors = profile.map_or_else(|| "[]".to_string(), |p| render_json(&p.color_preferences, false));

    format!(
        r#"As a fashion AI assistant, create outfit recommendations for a user based on their profile and wardrobe.

User Profile:
- Body Type: {body_type}
- Face Type: {face_type}
- Skin Tone: {skin_tone}
- Favorite Style: {style}
- Color Preferences: {colors}

Current Wardrobe Items ({count} items):
{wardrobe_json}

Please provide 3 types of outfit recommendations:
1. Wardrobe-only outfits (using only items from their current wardrobe)
2. Mixed outfits (combining wardrobe items with suggested new items)
3. New outfit suggestions (completely new items that would complement their style)

For each outfit, include:
- Type: "wardrobe_only", "mix", or "new"
- Items: List of clothing items with specific details (color, style, etc.)
- Comment: Brief explanation of the outfit and why it works for their profile

Consider:
- Color harmony with their skin tone and preferences
- Body type flattering combinations
- Seasonal appropriateness
- Occasion suitability

Return the response as a JSON object with an "outfits" array containing these 3 outfit objects."#,
        count = wardrobe.len(),
        wardrobe_json = render_json(wardrobe, true),
    )
}

/// Wraps free text in the short voice-assistant persona. The word limit is advisory only.
pub fn build_voice_prompt(user_text: &str) -> String {
    VOICE_TEMPLATE.replace("{user_text}", user_text)
}

/// The system message opening every conversation. A missing profile renders as `null`.
pub fn build_stylist_system_prompt(
    wardrobe: &[StylingView<'_>],
    profile: Option<&QuestionnaireProfile>,
) -> String {
    format!(
        "You are Stylo, a professional AI Fashion Stylist. The user's wardrobe: {}. \
         The user's style preferences and profile: {}. \
         Always consider these when giving advice or outfit suggestions.",
        render_json(wardrobe, false),
        render_json(&profile, false),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BodyType, FaceType, GarmentType, Occasion, SkinTone};
    use chrono::{TimeZone, Utc};

    fn item() -> WardrobeItem {
        WardrobeItem {
            id: "i1".to_string(),
            user_id: "u1".to_string(),
            garment_type: GarmentType::Jacket,
            color: "olive".to_string(),
            nature: Occasion::Business,
            image_url: "https://img/jacket.jpg".to_string(),
            material: "wool".to_string(),
            brand: "Acme".to_string(),
            size: "L".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn profile() -> QuestionnaireProfile {
        QuestionnaireProfile {
            user_id: "u1".to_string(),
            gender: "male".to_string(),
            age: "34".to_string(),
            skin_tone: SkinTone::Warm,
            face_type: FaceType::Square,
            body_type: BodyType::Tall,
            hair_style: "short".to_string(),
            favorite_brand: String::new(),
            nationality: String::new(),
            color_preferences: vec!["navy".to_string(), "grey".to_string()],
            favorite_accessories: String::new(),
            favorite_style: "smart casual".to_string(),
            occupation: "engineer".to_string(),
        }
    }

    #[test]
    fn recommendation_prompt_embeds_profile_and_wardrobe() {
        let prompt = build_recommendation_prompt(Some(&profile()), &[item()]);
        assert!(prompt.contains("- Body Type: tall"));
        assert!(prompt.contains("- Skin Tone: warm"));
        assert!(prompt.contains(r#"- Color Preferences: ["navy","grey"]"#));
        assert!(prompt.contains("Current Wardrobe Items (1 items):"));
        assert!(prompt.contains(r#""type": "jacket""#));
        assert!(prompt.contains(r#""createdAt": "2024-03-01T12:00:00Z""#));
        assert!(prompt.contains(r#""outfits" array"#));
    }

    #[test]
    fn recommendation_prompt_without_profile() {
        let prompt = build_recommendation_prompt(None, &[]);
        assert!(prompt.contains("- Face Type: Not specified"));
        assert!(prompt.contains("- Color Preferences: []"));
        assert!(prompt.contains("(0 items):\n[]"));
    }

    #[test]
    fn prompts_are_deterministic() {
        let items = [item()];
        assert_eq!(
            build_recommendation_prompt(Some(&profile()), &items),
            build_recommendation_prompt(Some(&profile()), &items)
        );
        assert_eq!(build_voice_prompt("hi"), build_voice_prompt("hi"));
    }

    #[test]
    fn voice_prompt_quotes_user_text() {
        let prompt = build_voice_prompt("What goes with olive?");
        assert!(prompt.starts_with(r#"You are a friendly fashion assistant. The user said: "What goes with olive?""#));
        assert!(prompt.contains("Under 100 words"));
    }

    #[test]
    fn system_prompt_marks_missing_profile() {
        let item = item();
        let prompt = build_stylist_system_prompt(&[item.styling_view()], None);
        assert!(prompt.contains("The user's style preferences and profile: null."));
        assert!(prompt.contains(r#""color":"olive""#));
        assert!(!prompt.contains("https://img/jacket.jpg"));
    }
}
