pub mod gateway;
pub mod models;
pub mod transport;

pub use gateway::OpenRouterGateway;
pub use models::{extract_answer, ChatMessage, ChatRequest, ContentPart, ImageUrl, MessageRole};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
