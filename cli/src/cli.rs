use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "verifymc")]
#[command(about = "Admin console for a VerifyMC whitelist portal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Portal origin, e.g. https://mc.example.com (overrides the config file)
    #[arg(long, global = true, env = "VERIFYMC_API_URL")]
    pub api_url: Option<String>,

    /// Language sent with admin calls (overrides the config file)
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in as the portal admin
    Login,
    /// Forget the stored admin session
    Logout,
    /// Show the current session
    Whoami,
    /// List registered users
    Users {
        /// Page to show, starting at 1
        #[arg(long, short = 'p', default_value = "1")]
        page: u32,

        /// Users per page
        #[arg(long, short = 's', default_value = "10")]
        size: u32,

        /// Filter by username or email
        #[arg(long, short = 'q')]
        search: Option<String>,
    },
    /// Approve a pending registration
    Approve { username: String },
    /// Reject a pending registration
    Reject {
        username: String,

        /// Reason shown to the player
        #[arg(long, short = 'r')]
        reason: Option<String>,
    },
    /// Ban a user
    Ban { username: String },
    /// Lift a ban
    Unban { username: String },
    /// Delete a user
    Delete { username: String },
    /// Set a new password for a user (prompts for it)
    Passwd { username: String },
    /// Show the Minecraft server status
    ServerStatus,
    /// Show recent admin actions
    Audits,
    /// Stream events from a live-status WebSocket until Ctrl-C
    Watch {
        /// WebSocket URL, e.g. ws://mc.example.com:8081
        url: String,
    },
    /// Show the plugin version and whether an update is available
    Version,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
