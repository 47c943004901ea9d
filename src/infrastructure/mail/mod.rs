//! Outbound email

mod resend;

pub use resend::{render_key_email, LogMailer, ResendMailer, RESEND_API_URL};
