use clap::Parser;

/// Schedule a one-hour Google Calendar meeting and record its link
#[derive(Debug, Clone, Parser)]
#[command(name = "meetsched", version, about)]
pub struct Cli {
    /// Event title
    #[arg(long, default_value = "Meeting")]
    pub summary: String,

    /// Event description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Start time in ISO-8601, e.g. 2024-03-01T09:00:00. Prompted for when omitted.
    #[arg(long)]
    pub start: Option<String>,

    /// IANA time zone for the event, defaults to TIMEZONE
    #[arg(long)]
    pub time_zone: Option<String>,

    /// Never prompt; a missing --start skips event creation
    #[arg(long)]
    pub no_prompt: bool,

    /// Print the authorization URL without opening a browser
    #[arg(long)]
    pub no_browser: bool,
}
