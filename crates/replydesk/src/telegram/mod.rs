//! Telegram Bot API integration: inbound webhook updates and outbound replies

pub mod notifier;
pub mod webhook;

pub use notifier::{DeliveryOutcome, Notifier, TelegramNotifier};
pub use webhook::{IncomingMessage, WebhookStatus};
