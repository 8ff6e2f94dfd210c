pub mod email;
pub mod hub;

pub use email::{Mailer, SmtpMailer};
pub use hub::{ConnectionGuard, SseHub};
