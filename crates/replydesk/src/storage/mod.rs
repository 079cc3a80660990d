//! Database access: connection pool, migrations, messages and admin sessions

pub mod db;
pub mod messages;
pub mod migrations;
pub mod sessions;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use messages::{Message, MessageStats, NewMessage};
pub use sessions::AdminSession;
