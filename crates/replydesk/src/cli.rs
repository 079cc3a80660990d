use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "replydesk")]
#[command(author, version, about = "Telegram bot inbox with an admin reply dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the webhook receiver and admin dashboard
    Serve {
        /// Port to listen on (overrides WEB_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Apply pending database migrations and exit
    Migrate,

    /// Register the public webhook URL with the Bot API
    SetWebhook {
        /// Public HTTPS URL ending in /webhook
        #[arg(long)]
        url: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
