pub mod auth_flow;
pub mod form_filler;
pub mod llm_service;
pub mod report_parser;

pub use auth_flow::LoginFlow;
pub use form_filler::TicketFormFiller;
pub use llm_service::LlmService;
