//! Shopkeep client-side data access
//!
//! Holds the session state of the signed-in staff member, attaches its bearer
//! token to calls against the Shopkeep API and normalizes responses and errors.

pub mod client;
pub mod config;
pub mod guard;
pub mod session;
pub mod storage;
pub mod types;

pub use client::error::ClientError;
pub use client::query::{Query, QueryValue};
pub use client::upload::{DEFAULT_UPLOAD_FIELD, UploadFile};
pub use client::{ApiClient, ApiClientBuilder, RequestOptions};
pub use config::ClientConfig;
pub use guard::{GuardDecision, Redirects, RouteGuard};
pub use session::{Session, SessionEvent, SessionState};
pub use storage::{FileTokenStore, MemoryTokenStore, Persistence, TokenStore};
pub use types::{Paginated, Role, TokenResponse, User};
