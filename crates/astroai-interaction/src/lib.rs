//! HTTP collaborators: the OpenRouter chat-completions gateway, the SerpAPI
//! forecast fetcher, and palm photo preparation for vision requests.

mod http_error;
pub mod image_payload;
pub mod openrouter_api_agent;
pub mod serp_api_agent;

pub use image_payload::{PalmImage, prepare_palm_image};
pub use openrouter_api_agent::OpenRouterGateway;
pub use serp_api_agent::SerpApiFetcher;
