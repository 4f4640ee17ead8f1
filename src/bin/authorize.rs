//! Log in once and cache the Google token without scheduling anything.

use meetsched::components::google_calendar::{Authenticator, FileTokenStore, InstalledAppFlow};
use meetsched::config::Config;
use meetsched::error::BotResult;

#[tokio::main(flavor = "current_thread")]
async fn main() -> BotResult<()> {
    // Load configuration
    let config = Config::load()?;
    let http = config.http_client()?;

    let authenticator = Authenticator::new(
        Box::new(FileTokenStore::new(&config.token_path)),
        Box::new(InstalledAppFlow::new(http.clone()).with_timeout(config.auth_timeout)),
        http,
        &config.credentials_path,
    )
    .with_credentials_json(config.resolve_credentials_json()?);

    println!("Opening browser for Google Calendar authorization...");
    let session = authenticator.authenticate().await?;

    match session.token().expires_at {
        Some(expires_at) => println!(
            "Token saved to {} (valid until {})",
            config.token_path.display(),
            expires_at
        ),
        None => println!("Token saved to {}", config.token_path.display()),
    }

    Ok(())
}
