pub mod conversation;
pub mod domain;
pub mod ports;
pub mod prompts;
pub mod recommendation;
pub mod validation;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use conversation::{ConversationOrchestrator, DEFAULT_HISTORY_WINDOW};
pub use domain::{
    BodyType, ChatRole, ChatTurn, ClosedSet, ColorPreferences, FaceType, GarmentType,
    NewWardrobeItem, Occasion, QuestionnaireAnswers, QuestionnaireProfile, SkinTone,
    StoredMessage, StylingView, WardrobeItem, WardrobeItemDraft,
};
pub use ports::{CompletionService, DatabaseService, IdentityService, PortError, PortResult};
pub use recommendation::RecommendationService;
pub use validation::{normalize_questionnaire, validate_wardrobe_item, ValidationError};
