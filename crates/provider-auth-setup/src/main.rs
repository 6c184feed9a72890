/*
[INPUT]:  CLI arguments, .env file, PROVIDER_* environment variables
[OUTPUT]: Access/refresh tokens on stdout, or one authenticated API response
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or output format
*/

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use provider_auth_adapter::config::{ENV_ACCESS_TOKEN, ENV_REFRESH_TOKEN};
use provider_auth_adapter::{
    ApiSettings, AuthManager, AuthSettings, ClientConfig, IssuedTokens, ProviderClient,
    RequestOptions, ResolverConfig,
};
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "provider-auth-setup",
    version,
    about = "Authenticate with a trading API provider using an EIP-712 signature"
)]
struct Cli {
    /// Load variables from this file instead of ./.env
    #[arg(long = "env-file", value_name = "PATH", global = true)]
    env_file: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign the provider's challenge and print the issued tokens (default)
    Login(LoginArgs),
    /// Send one authenticated request with PROVIDER_ACCESS_TOKEN
    Call(CallArgs),
}

#[derive(clap::Args, Debug, Default)]
struct LoginArgs {
    /// Skip the reachability probe of the base URL
    #[arg(long = "no-precheck")]
    no_precheck: bool,
    /// Print the tokens as one JSON object
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct CallArgs {
    /// API path, e.g. /v1/positions
    path: String,
    #[arg(long, short = 'X', default_value = "GET")]
    method: String,
    /// JSON request body
    #[arg(long, short = 'd')]
    data: Option<String>,
    /// Extra header as NAME:VALUE (repeatable)
    #[arg(long = "header", short = 'H', value_name = "NAME:VALUE")]
    headers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;
    load_env_file(cli.env_file.as_ref())?;

    match cli.command.unwrap_or(Command::Login(LoginArgs::default())) {
        Command::Login(args) => run_login(args).await,
        Command::Call(args) => run_call(args).await,
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_env_file(path: Option<&PathBuf>) -> Result<()> {
    match path {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("load env file {}", path.display()))?;
            info!(path = %path.display(), "loaded env file");
        }
        None => {
            if let Ok(path) = dotenv::dotenv() {
                info!(path = %path.display(), "loaded env file");
            }
        }
    }
    Ok(())
}

async fn run_login(args: LoginArgs) -> Result<()> {
    let settings = AuthSettings::from_env().context("read auth settings")?;
    info!(
        api_base = %settings.api_base,
        client_id = %settings.client_id,
        address = %settings.user_address,
        "starting authentication"
    );

    let resolver_config = ResolverConfig {
        reachability_check: !args.no_precheck,
    };
    let manager = AuthManager::with_config(settings, &ClientConfig::default(), resolver_config)
        .context("build auth manager")?;

    let issued = manager.authenticate().await.context("authentication failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&issued)?);
    } else {
        print!("{}", format_tokens(&issued));
    }
    Ok(())
}

fn format_tokens(issued: &IssuedTokens) -> String {
    let mut out = String::new();
    out.push_str("=== Authentication Tokens ===\n");
    out.push_str(&format!("Access Token: {}\n", issued.tokens.access_token));
    out.push_str(&format!("Refresh Token: {}\n", issued.tokens.refresh_token));
    if let Some(expires_in) = issued.tokens.expires_in {
        out.push_str(&format!("Expires In: {expires_in} seconds\n"));
    }
    if let Some(expires_at) = issued.expires_at {
        out.push_str(&format!("Expires At: {}\n", expires_at.to_rfc3339()));
    }
    out.push_str("=============================\n\n");
    out.push_str(&format!(
        "Paste these into your .env as {ENV_ACCESS_TOKEN} and {ENV_REFRESH_TOKEN}.\n"
    ));
    out
}

async fn run_call(args: CallArgs) -> Result<()> {
    let settings = ApiSettings::from_env().context("read API settings")?;
    let client = ProviderClient::new(&settings).context("build provider client")?;

    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method {}", args.method))?;
    let mut options = RequestOptions::with_method(method);
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        options = options.header(name, value);
    }
    if let Some(data) = &args.data {
        let body: serde_json::Value =
            serde_json::from_str(data).context("--data must be valid JSON")?;
        options = options.json(&body)?;
    }

    let url = client.url_for(&args.path);
    info!(url = %url, "sending authenticated request");
    let response = client
        .request(&args.path, options)
        .await
        .with_context(|| format!("request to {url} failed"))?;

    let status = response.status();
    let body = response.text().await.context("read response body")?;
    if !status.is_success() {
        warn!(status = status.as_u16(), "provider returned non-success status");
    }
    println!("{}", status);
    println!("{body}");
    Ok(())
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue)> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("header must be NAME:VALUE, got {raw}");
    };
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .with_context(|| format!("invalid header name in {raw}"))?;
    let value = HeaderValue::from_str(value.trim())
        .with_context(|| format!("invalid header value in {raw}"))?;
    Ok((name, value))
}
