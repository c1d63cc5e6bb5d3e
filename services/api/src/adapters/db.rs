//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use stylo_core::domain::{
    ChatRole, NewWardrobeItem, QuestionnaireProfile, StoredMessage, WardrobeItem,
};
use stylo_core::ports::{DatabaseService, PortError, PortResult};
use stylo_core::validation::normalize_choice;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct QuestionnaireRecord {
    user_id: String,
    gender: String,
    age: String,
    skin_tone: String,
    face_type: String,
    body_type: String,
    hair_style: String,
    favorite_brand: String,
    nationality: String,
    color_preferences: Vec<String>,
    favorite_accessories: String,
    favorite_style: String,
    occupation: String,
}
impl QuestionnaireRecord {
    fn to_domain(self) -> QuestionnaireProfile {
        QuestionnaireProfile {
            user_id: self.user_id,
            gender: self.gender,
            age: self.age,
            skin_tone: normalize_choice(&self.skin_tone),
            face_type: normalize_choice(&self.face_type),
            body_type: normalize_choice(&self.body_type),
            hair_style: self.hair_style,
            favorite_brand: self.favorite_brand,
            nationality: self.nationality,
            color_preferences: self.color_preferences,
            favorite_accessories: self.favorite_accessories,
            favorite_style: self.favorite_style,
            occupation: self.occupation,
        }
    }
}

#[derive(FromRow)]
struct WardrobeItemRecord {
    id: String,
    user_id: String,
    garment_type: String,
    color: String,
    nature: String,
    image_url: String,
    material: String,
    brand: String,
    size: String,
    created_at: DateTime<Utc>,
}
impl WardrobeItemRecord {
    fn to_domain(self) -> WardrobeItem {
        WardrobeItem {
            id: self.id,
            user_id: self.user_id,
            garment_type: normalize_choice(&self.garment_type),
            color: self.color,
            nature: normalize_choice(&self.nature),
            image_url: self.image_url,
            material: self.material,
            brand: self.brand,
            size: self.size,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ChatMessageRecord {
    id: i64,
    user_id: String,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}
impl ChatMessageRecord {
    fn to_domain(self) -> StoredMessage {
        StoredMessage {
            id: self.id,
            user_id: self.user_id,
            role: self.role,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

const WARDROBE_COLUMNS: &str =
    "id, user_id, garment_type, color, nature, image_url, material, brand, size, created_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_questionnaire(&self, profile: &QuestionnaireProfile) -> PortResult<()> {
        // The primary key makes the existence check and the write a single atomic step.
        let result = sqlx::query(
            "INSERT INTO questionnaires (user_id, gender, age, skin_tone, face_type, body_type, \
             hair_style, favorite_brand, nationality, color_preferences, favorite_accessories, \
             favorite_style, occupation) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(&profile.user_id)
        .bind(&profile.gender)
        .bind(&profile.age)
        .bind(profile.skin_tone.to_string())
        .bind(profile.face_type.to_string())
        .bind(profile.body_type.to_string())
        .bind(&profile.hair_style)
        .bind(&profile.favorite_brand)
        .bind(&profile.nationality)
        .bind(&profile.color_preferences)
        .bind(&profile.favorite_accessories)
        .bind(&profile.favorite_style)
        .bind(&profile.occupation)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::Conflict(format!(
                "Questionnaire for user {} already exists",
                profile.user_id
            )));
        }
        Ok(())
    }

    async fn find_questionnaire(&self, user_id: &str) -> PortResult<Option<QuestionnaireProfile>> {
        let record = sqlx::query_as::<_, QuestionnaireRecord>(
            "SELECT user_id, gender, age, skin_tone, face_type, body_type, hair_style, \
             favorite_brand, nationality, color_preferences, favorite_accessories, \
             favorite_style, occupation FROM questionnaires WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(QuestionnaireRecord::to_domain))
    }

    async fn add_wardrobe_item(&self, item: NewWardrobeItem) -> PortResult<WardrobeItem> {
        let record = sqlx::query_as::<_, WardrobeItemRecord>(&format!(
            "INSERT INTO wardrobe_items (id, user_id, garment_type, color, nature, image_url, \
             material, brand, size) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {}",
            WARDROBE_COLUMNS
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&item.user_id)
        .bind(item.garment_type.to_string())
        .bind(&item.color)
        .bind(item.nature.to_string())
        .bind(&item.image_url)
        .bind(&item.material)
        .bind(&item.brand)
        .bind(&item.size)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn list_wardrobe(&self, user_id: &str) -> PortResult<Vec<WardrobeItem>> {
        let records = sqlx::query_as::<_, WardrobeItemRecord>(&format!(
            "SELECT {} FROM wardrobe_items WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
            WARDROBE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_wardrobe_item(&self, user_id: &str, item_id: &str) -> PortResult<WardrobeItem> {
        let record = sqlx::query_as::<_, WardrobeItemRecord>(&format!(
            "SELECT {} FROM wardrobe_items WHERE user_id = $1 AND id = $2",
            WARDROBE_COLUMNS
        ))
        .bind(user_id)
        .bind(item_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Wardrobe item {} not found", item_id)),
            _ => unexpected(e),
        })?;

        Ok(record.to_domain())
    }

    async fn delete_wardrobe_item(&self, user_id: &str, item_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM wardrobe_items WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn recent_messages(&self, user_id: &str, limit: usize) -> PortResult<Vec<StoredMessage>> {
        let records = sqlx::query_as::<_, ChatMessageRecord>(
            "SELECT id, user_id, role, content, created_at FROM chat_messages \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn append_exchange(
        &self,
        user_id: &str,
        user_text: &str,
        assistant_text: &str,
        captured_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        for (role, content) in [(ChatRole::User, user_text), (ChatRole::Assistant, assistant_text)] {
            sqlx::query(
                "INSERT INTO chat_messages (user_id, role, content, created_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(user_id)
            .bind(role.as_str())
            .bind(content)
            .bind(captured_at)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }
        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }
}
