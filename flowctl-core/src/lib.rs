//! flowctl-core - client for hosted Langflow flow execution
//!
//! This crate provides:
//! - `FlowInvoker`: one authenticated POST per chat turn
//! - `FlowTransport` seam with reqwest and mock implementations
//! - `FileUploader` capability for flows with file inputs
//! - Layered configuration (`FlowConfig`) and chat history (`ChatSession`)
//!
//! ## Architecture
//!
//! ```text
//! FlowConfig → AuthContext ─┐
//! message + tweaks ─────────┴→ FlowInvoker → FlowTransport → /lf/<tenant>/api/v1/run/<flow>
//!                                   ↓
//!                        serde_json::Value → response::message_text
//! ```

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod invoker;
pub mod request;
pub mod response;
pub mod transport;
pub mod upload;

pub use auth::{AuthContext, DEFAULT_BASE_URL};
pub use chat::{ChatHistoryEntry, ChatRole, ChatSession};
pub use config::{ConnectionOverrides, FlowConfig, ResolvedSettings};
pub use error::{FlowError, Result, TransportError, TransportErrorKind};
pub use invoker::{FlowInvoker, InvocationResult};
pub use request::{InvocationRequest, Tweaks};
pub use response::message_text;
pub use transport::{FlowTransport, HttpRequest, HttpResponse, MockTransport, ReqwestTransport};
pub use upload::{FileUploader, NoUploader};
#[cfg(feature = "upload")]
pub use upload::HttpUploader;
