pub mod assistant;
pub mod middleware;
pub mod questionnaire;
pub mod rest;
pub mod router;
pub mod state;
pub mod wardrobe;

// Re-export what the binary needs to build and serve the application.
pub use middleware::require_auth;
pub use router::build_router;
pub use state::AppState;
