use crate::cli::Cli;
use crate::components::google_calendar::time::EventTime;
use crate::components::google_calendar::{
    create_meeting, Authenticator, FileTokenStore, InstalledAppFlow, MeetingOutcome,
    MeetingRequest, StartTime,
};
use crate::components::link_store;
use crate::components::prompt::prompt_datetime;
use crate::config::Config;
use crate::error::{other_error, BotResult, Error};
use std::io::{self, Write};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub const START_PROMPT: &str = "Enter meeting start time (YYYY-MM-DD HH:MM): ";

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| other_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Authenticate, collect the start time and schedule one meeting
pub async fn run(config: Config, cli: Cli) -> miette::Result<()> {
    let mut stdout = io::stdout();
    print_banner(&mut stdout).map_err(Error::from)?;

    let http = config.http_client()?;
    let credentials_json = config.resolve_credentials_json()?;
    let store = link_store::connect(&config)?;

    let flow = InstalledAppFlow::new(http.clone())
        .with_timeout(config.auth_timeout)
        .with_browser(!cli.no_browser);
    let authenticator = Authenticator::new(
        Box::new(FileTokenStore::new(&config.token_path)),
        Box::new(flow),
        http,
        &config.credentials_path,
    )
    .with_credentials_json(credentials_json);

    let session = authenticator.authenticate().await?;
    info!("Authenticated with Google Calendar");

    let request = MeetingRequest {
        summary: cli.summary.clone(),
        description: cli.description.clone(),
        start_time: resolve_start(&cli).await?,
        time_zone: cli.time_zone.clone().unwrap_or_else(|| config.timezone.clone()),
    };

    let calendar = session.calendar(&config.calendar_id);
    let outcome = create_meeting(&calendar, store.as_ref(), &request).await;

    report(&outcome, &mut stdout).map_err(Error::from)?;
    Ok(())
}

fn print_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n\u{1F539} Welcome to the Automated Meeting Scheduler \u{1F539}\n")?;
    writeln!(out, "Note: You will be asked to log in with your Google account.\n")
}

/// `--start` wins, then the prompt unless disabled
async fn resolve_start(cli: &Cli) -> BotResult<StartTime> {
    if let Some(start) = &cli.start {
        return Ok(StartTime::Text(start.clone()));
    }
    if cli.no_prompt {
        return Ok(StartTime::Missing);
    }

    let answer = tokio::task::spawn_blocking(|| {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        prompt_datetime(&mut input, &mut io::stdout(), START_PROMPT)
    })
    .await
    .map_err(|e| other_error(&format!("Prompt task failed: {}", e)))??;

    Ok(StartTime::At(EventTime::Floating(answer)))
}

/// Print the console status line for an outcome
pub fn report<W: Write>(outcome: &MeetingOutcome, out: &mut W) -> io::Result<()> {
    match outcome {
        MeetingOutcome::Scheduled {
            link,
            link_recorded,
        } => {
            writeln!(
                out,
                "\u{2705} Meeting has been successfully scheduled!\nEvent details: {}",
                link
            )?;
            if let Err(e) = link_recorded {
                writeln!(out, "\u{26A0}\u{FE0F} The meeting link could not be saved: {}", e)?;
            }
        }
        MeetingOutcome::Skipped(reason) => writeln!(out, "{}", reason)?,
        MeetingOutcome::Failed(reason) => writeln!(out, "Error creating event: {}", reason)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::SkipReason;
    use crate::error::link_store_error;

    fn render(outcome: &MeetingOutcome) -> String {
        let mut out = Vec::new();
        report(outcome, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn reports_scheduled_link() {
        let text = render(&MeetingOutcome::Scheduled {
            link: "https://calendar.test/e1".to_string(),
            link_recorded: Ok(()),
        });
        assert_eq!(
            text,
            "\u{2705} Meeting has been successfully scheduled!\n\
             Event details: https://calendar.test/e1\n"
        );
    }

    #[test]
    fn reports_unsaved_link_separately() {
        let text = render(&MeetingOutcome::Scheduled {
            link: "https://calendar.test/e1".to_string(),
            link_recorded: Err(link_store_error("connection refused")),
        });
        assert!(text.contains("Event details: https://calendar.test/e1"));
        assert!(text.contains("could not be saved"));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn reports_skip_and_failure() {
        assert_eq!(
            render(&MeetingOutcome::Skipped(SkipReason::MissingStartTime)),
            "No valid start_time provided. Skipping meeting creation.\n"
        );
        assert_eq!(
            render(&MeetingOutcome::Failed("HTTP 401".to_string())),
            "Error creating event: HTTP 401\n"
        );
    }

    #[test]
    fn banner_matches_console_text() {
        let mut out = Vec::new();
        print_banner(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Welcome to the Automated Meeting Scheduler"));
        assert!(text.contains("log in with your Google account"));
    }

    #[tokio::test]
    async fn explicit_start_skips_prompt() {
        let cli = Cli {
            summary: "Meeting".to_string(),
            description: String::new(),
            start: Some("2024-03-01T09:00".to_string()),
            time_zone: None,
            no_prompt: false,
            no_browser: true,
        };
        assert_eq!(
            resolve_start(&cli).await.unwrap(),
            StartTime::Text("2024-03-01T09:00".to_string())
        );

        let cli = Cli {
            start: None,
            no_prompt: true,
            ..cli
        };
        assert_eq!(resolve_start(&cli).await.unwrap(), StartTime::Missing);
    }
}
