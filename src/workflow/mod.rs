pub mod ticket_ctx;
pub mod ticket_flow;

pub use ticket_ctx::TicketCtx;
pub use ticket_flow::TicketFlow;
