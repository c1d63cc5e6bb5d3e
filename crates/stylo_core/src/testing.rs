//! In-memory port doubles shared by the unit tests and, through the
//! `test-util` feature, by the HTTP tests of the service crate.

use crate::domain::{
    BodyType, ChatTurn, FaceType, GarmentType, NewWardrobeItem, Occasion, QuestionnaireProfile,
    SkinTone, StoredMessage, WardrobeItem,
};
use crate::ports::{CompletionService, DatabaseService, PortError, PortResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<Vec<QuestionnaireProfile>>,
    items: Mutex<Vec<WardrobeItem>>,
    messages: Mutex<Vec<StoredMessage>>,
    next_item: AtomicUsize,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn insert_item(&self, item: WardrobeItem) {
        self.items.lock().unwrap().push(item);
    }

    pub fn insert_profile(&self, profile: QuestionnaireProfile) {
        self.profiles.lock().unwrap().push(profile);
    }

    pub fn push_raw(&self, user_id: &str, role: &str, content: &str) {
        let mut messages = self.messages.lock().unwrap();
        let id = messages.len() as i64 + 1;
        messages.push(StoredMessage {
            id,
            user_id: user_id.to_string(),
            role: role.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        });
    }

    pub fn item_count(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    /// All of the user's messages in insertion order.
    pub fn messages_for(&self, user_id: &str) -> Vec<StoredMessage> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    fn check_reads(&self) -> PortResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseService for MemoryStore {
    async fn create_questionnaire(&self, profile: &QuestionnaireProfile) -> PortResult<()> {
        let mut profiles = self.profiles.lock().unwrap();
        if profiles.iter().any(|p| p.user_id == profile.user_id) {
            return Err(PortError::Conflict(profile.user_id.clone()));
        }
        profiles.push(profile.clone());
        Ok(())
    }

    async fn find_questionnaire(&self, user_id: &str) -> PortResult<Option<QuestionnaireProfile>> {
        self.check_reads()?;
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn add_wardrobe_item(&self, item: NewWardrobeItem) -> PortResult<WardrobeItem> {
        let n = self.next_item.fetch_add(1, Ordering::SeqCst) + 1;
        let mut items = self.items.lock().unwrap();
        let stored = WardrobeItem {
            id: format!("item-{}", n),
            user_id: item.user_id,
            garment_type: item.garment_type,
            color: item.color,
            nature: item.nature,
            image_url: item.image_url,
            material: item.material,
            brand: item.brand,
            size: item.size,
            created_at: Utc::now(),
        };
        items.push(stored.clone());
        Ok(stored)
    }

    async fn list_wardrobe(&self, user_id: &str) -> PortResult<Vec<WardrobeItem>> {
        self.check_reads()?;
        let items = self.items.lock().unwrap();
        Ok(items.iter().filter(|i| i.user_id == user_id).cloned().collect())
    }

    async fn get_wardrobe_item(&self, user_id: &str, item_id: &str) -> PortResult<WardrobeItem> {
        self.check_reads()?;
        let items = self.items.lock().unwrap();
        items
            .iter()
            .find(|i| i.user_id == user_id && i.id == item_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(item_id.to_string()))
    }

    async fn delete_wardrobe_item(&self, user_id: &str, item_id: &str) -> PortResult<()> {
        self.items
            .lock()
            .unwrap()
            .retain(|i| !(i.user_id == user_id && i.id == item_id));
        Ok(())
    }

    async fn recent_messages(&self, user_id: &str, limit: usize) -> PortResult<Vec<StoredMessage>> {
        self.check_reads()?;
        let mut mine = self.messages_for(user_id);
        mine.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        mine.truncate(limit);
        Ok(mine)
    }

    async fn append_exchange(
        &self,
        user_id: &str,
        user_text: &str,
        assistant_text: &str,
        captured_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut messages = self.messages.lock().unwrap();
        for (role, content) in [("user", user_text), ("assistant", assistant_text)] {
            let id = messages.len() as i64 + 1;
            messages.push(StoredMessage {
                id,
                user_id: user_id.to_string(),
                role: role.to_string(),
                content: content.to_string(),
                created_at: captured_at,
            });
        }
        Ok(())
    }
}

/// Replies with a fixed text and records every request.
pub struct ScriptedCompletion {
    reply: String,
    requests: Mutex<Vec<Vec<ChatTurn>>>,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn last_request(&self) -> Vec<ChatTurn> {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, messages: &[ChatTurn]) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(messages.to_vec());
        self.reply.clone()
    }
}

pub fn sample_item(user_id: &str) -> WardrobeItem {
    WardrobeItem {
        id: "item-1".to_string(),
        user_id: user_id.to_string(),
        garment_type: GarmentType::Shirt,
        color: "blue".to_string(),
        nature: Occasion::Casual,
        image_url: "https://x/y.jpg".to_string(),
        material: "linen".to_string(),
        brand: "Acme".to_string(),
        size: "M".to_string(),
        created_at: Utc::now(),
    }
}

pub fn sample_profile(user_id: &str) -> QuestionnaireProfile {
    QuestionnaireProfile {
        user_id: user_id.to_string(),
        gender: "female".to_string(),
        age: "27".to_string(),
        skin_tone: SkinTone::Warm,
        face_type: FaceType::Heart,
        body_type: BodyType::Petite,
        hair_style: "bob".to_string(),
        favorite_brand: "Acme".to_string(),
        nationality: "French".to_string(),
        color_preferences: vec!["beige".to_string()],
        favorite_accessories: "scarves".to_string(),
        favorite_style: "classic".to_string(),
        occupation: "designer".to_string(),
    }
}
