//! crates/stylo_core/src/domain.rs
//!
//! Defines the core data structures for the application: wardrobe garments,
//! the questionnaire profile and the chat history records.
//!
//! Every entity is scoped to a user identifier. Serialization derives exist
//! because these values are embedded as JSON into the prompts sent to the
//! language model; the wire format of the HTTP layer lives in the `api` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//=========================================================================================
// Closed Enumerations
//=========================================================================================

/// A value drawn from a fixed set of lowercase tokens with a designated fallback.
pub trait ClosedSet: Sized + Copy + Default + 'static {
    /// Every member of the set, in declaration order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Exact match against the canonical token; no trimming or case folding.
    fn parse(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == token)
    }
}

macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $name:ident (default = $default:ident) {
            $($variant:ident => $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $token)] $variant),+
        }

        impl ClosedSet for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_set! {
    /// The kind of garment a wardrobe item is.
    GarmentType (default = Accessory) {
        Shirt => "shirt",
        Pants => "pants",
        Dress => "dress",
        Skirt => "skirt",
        Jacket => "jacket",
        Sweater => "sweater",
        Shoes => "shoes",
        Accessory => "accessory",
    }
}

closed_set! {
    /// The occasion a garment suits (the "nature" field on the wire).
    Occasion (default = Casual) {
        Casual => "casual",
        Formal => "formal",
        Business => "business",
        Party => "party",
        Sport => "sport",
        Elegant => "elegant",
    }
}

closed_set! {
    BodyType (default = Athletic) {
        Athletic => "athletic",
        Slim => "slim",
        Curvy => "curvy",
        PlusSize => "plus-size",
        Petite => "petite",
        Tall => "tall",
    }
}

closed_set! {
    FaceType (default = Oval) {
        Oval => "oval",
        Round => "round",
        Square => "square",
        Heart => "heart",
        Diamond => "diamond",
        Triangle => "triangle",
    }
}

closed_set! {
    SkinTone (default = Neutral) {
        Warm => "warm",
        Cool => "cool",
        Neutral => "neutral",
        Olive => "olive",
        Fair => "fair",
        Medium => "medium",
        Dark => "dark",
    }
}

//=========================================================================================
// Wardrobe
//=========================================================================================

/// A garment record owned by one user. Created on add, removed on delete, never updated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub garment_type: GarmentType,
    pub color: String,
    pub nature: Occasion,
    pub image_url: String,
    pub material: String,
    pub brand: String,
    pub size: String,
    pub created_at: DateTime<Utc>,
}

impl WardrobeItem {
    /// The item as the stylist sees it: the image link and the capture time are left out.
    pub fn styling_view(&self) -> StylingView<'_> {
        StylingView {
            id: &self.id,
            user_id: &self.user_id,
            garment_type: self.garment_type,
            color: &self.color,
            nature: self.nature,
            material: &self.material,
            brand: &self.brand,
            size: &self.size,
        }
    }
}

/// Borrowed projection of a [`WardrobeItem`] used as conversation context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StylingView<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    #[serde(rename = "type")]
    pub garment_type: GarmentType,
    pub color: &'a str,
    pub nature: Occasion,
    pub material: &'a str,
    pub brand: &'a str,
    pub size: &'a str,
}

/// Raw, client-supplied wardrobe fields before normalization.
#[derive(Debug, Clone, Default)]
pub struct WardrobeItemDraft {
    pub user_id: String,
    pub garment_type: String,
    pub color: String,
    pub nature: String,
    pub image_url: String,
    pub material: String,
    pub brand: String,
    pub size: String,
}

/// A validated wardrobe item that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWardrobeItem {
    pub user_id: String,
    pub garment_type: GarmentType,
    pub color: String,
    pub nature: Occasion,
    pub image_url: String,
    pub material: String,
    pub brand: String,
    pub size: String,
}

//=========================================================================================
// Questionnaire
//=========================================================================================

/// Preferred colors as submitted: either one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColorPreferences {
    One(String),
    Many(Vec<String>),
}

impl Default for ColorPreferences {
    fn default() -> Self {
        ColorPreferences::Many(Vec::new())
    }
}

/// Raw questionnaire answers before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionnaireAnswers {
    pub user_id: String,
    pub gender: String,
    pub age: String,
    pub skin_tone: String,
    pub face_type: String,
    pub body_type: String,
    pub hair_style: String,
    pub favorite_brand: String,
    pub nationality: String,
    pub color_preferences: ColorPreferences,
    pub favorite_accessories: String,
    pub favorite_style: String,
    pub occupation: String,
}

/// A user's one-time style questionnaire. At most one exists per user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireProfile {
    pub user_id: String,
    pub gender: String,
    pub age: String,
    pub skin_tone: SkinTone,
    pub face_type: FaceType,
    pub body_type: BodyType,
    pub hair_style: String,
    pub favorite_brand: String,
    pub nationality: String,
    pub color_preferences: Vec<String>,
    pub favorite_accessories: String,
    pub favorite_style: String,
    pub occupation: String,
}

impl From<&QuestionnaireProfile> for QuestionnaireAnswers {
    fn from(profile: &QuestionnaireProfile) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            gender: profile.gender.clone(),
            age: profile.age.clone(),
            skin_tone: profile.skin_tone.as_str().to_string(),
            face_type: profile.face_type.as_str().to_string(),
            body_type: profile.body_type.as_str().to_string(),
            hair_style: profile.hair_style.clone(),
            favorite_brand: profile.favorite_brand.clone(),
            nationality: profile.nationality.clone(),
            color_preferences: ColorPreferences::Many(profile.color_preferences.clone()),
            favorite_accessories: profile.favorite_accessories.clone(),
            favorite_style: profile.favorite_style.clone(),
            occupation: profile.occupation.clone(),
        }
    }
}

//=========================================================================================
// Conversation
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::System => "system",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            "system" => Some(ChatRole::System),
            _ => None,
        }
    }
}

/// One message handed to the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// A persisted chat history record, as read back from the store.
///
/// `id` is the insertion ordinal. Two records written in the same turn share
/// `created_at`, so ordering ties are broken by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub id: i64,
    pub user_id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    /// Converts the record into a model turn; `None` when the role is unknown or the content blank.
    pub fn to_turn(&self) -> Option<ChatTurn> {
        let role = ChatRole::parse(self.role.trim())?;
        if self.content.trim().is_empty() {
            return None;
        }
        Some(ChatTurn::new(role, self.content.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: i64, role: &str, content: &str) -> StoredMessage {
        StoredMessage {
            id,
            user_id: "u1".to_string(),
            role: role.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn closed_set_parses_only_canonical_tokens() {
        assert_eq!(GarmentType::parse("shoes"), Some(GarmentType::Shoes));
        assert_eq!(BodyType::parse("plus-size"), Some(BodyType::PlusSize));
        assert_eq!(GarmentType::parse("Shoes"), None);
        assert_eq!(Occasion::parse(""), None);
    }

    #[test]
    fn defaults_match_fallback_policy() {
        assert_eq!(GarmentType::default(), GarmentType::Accessory);
        assert_eq!(Occasion::default(), Occasion::Casual);
        assert_eq!(BodyType::default(), BodyType::Athletic);
        assert_eq!(FaceType::default(), FaceType::Oval);
        assert_eq!(SkinTone::default(), SkinTone::Neutral);
    }

    #[test]
    fn styling_view_drops_image_and_timestamp() {
        let item = WardrobeItem {
            id: "i1".to_string(),
            user_id: "u1".to_string(),
            garment_type: GarmentType::Shirt,
            color: "blue".to_string(),
            nature: Occasion::Casual,
            image_url: "https://x/y.jpg".to_string(),
            material: "cotton".to_string(),
            brand: String::new(),
            size: "M".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(item.styling_view()).unwrap();
        assert_eq!(json["type"], "shirt");
        assert_eq!(json["nature"], "casual");
        assert!(json.get("imageUrl").is_none());
        assert!(json.get("createdAt").is_none());

        let full = serde_json::to_value(&item).unwrap();
        assert_eq!(full["imageUrl"], "https://x/y.jpg");
        assert!(full["createdAt"].is_string());
    }

    #[test]
    fn malformed_history_records_are_not_turns() {
        assert_eq!(
            stored(1, "user", "hi").to_turn(),
            Some(ChatTurn::user("hi"))
        );
        assert_eq!(stored(2, "", "hi").to_turn(), None);
        assert_eq!(stored(3, "narrator", "hi").to_turn(), None);
        assert_eq!(stored(4, "assistant", "   ").to_turn(), None);
    }

    #[test]
    fn color_preferences_accept_string_or_list() {
        let one: ColorPreferences = serde_json::from_str(r#""blue""#).unwrap();
        assert_eq!(one, ColorPreferences::One("blue".to_string()));
        let many: ColorPreferences = serde_json::from_str(r#"["blue","red"]"#).unwrap();
        assert_eq!(
            many,
            ColorPreferences::Many(vec!["blue".to_string(), "red".to_string()])
        );
    }
}
