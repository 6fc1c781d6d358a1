pub mod auth;
pub mod middleware;
pub mod rest;
pub mod router;
pub mod state;
pub mod student;
pub mod teacher;

// Re-export what the binaries need to stand the server up.
pub use middleware::require_role;
pub use router::create_router;
pub use state::AppState;
