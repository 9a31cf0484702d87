pub mod catalog;
pub mod error;
pub mod router;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use catalog::{format_price, Catalog, ProductRecord};
pub use error::CatalogError;
pub use router::{classify, route, RouteKind, Router, LIST_COMMAND};
pub use session::{ChatSession, ReplyTiming, Responder, Submission};
pub use state::{ChatMessage, ChatRole, Reply, ReplyStage};
