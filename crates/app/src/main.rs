//! Graphlink device login.
//!
//! Runs the device-authorization flow against the API configured through
//! the `GRAPHLINK_*` environment variables and prints the issued token.
//! Permissions to request are passed as arguments.

mod device_login;

use graphlink_domain::Scope;
use graphlink_infrastructure::GraphClientBuilder;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let scope: Scope = std::env::args().skip(1).collect();
    let client = GraphClientBuilder::from_env()?.build()?;

    tracing::info!(
        "Starting Graphlink device login v{} (scope: {scope})",
        env!("CARGO_PKG_VERSION")
    );

    let code = client.fetch_device_code(&scope).await?;
    println!(
        "Visit {} and enter the code {}",
        code.verification_uri, code.user_code
    );

    let token =
        device_login::poll_for_token(&code, || client.obtain_device_access_token(&code.code))
            .await?;

    match token.expires_at {
        Some(expires_at) => println!("{} (expires {expires_at})", token.access_token),
        None => println!("{}", token.access_token),
    }

    Ok(())
}
