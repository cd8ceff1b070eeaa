use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use courier_lib::config::ConfigTree;
use courier_lib::{ApiError, ApiResponse, ClientRegistry, ConfigError, Credentials, RequestData};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Call configured HTTP API providers.
///
/// Providers, their authentication and their endpoints are read from a
/// YAML, TOML or JSON configuration file. `${VAR}` placeholders in string
/// values are expanded from the environment.
///
/// Examples:
///   courier -c providers.yaml call mySanctumProvider getTracks --data '{"id":15}'
///   courier -c providers.yaml request vipas get https://example.com/positions
///   courier -c providers.yaml endpoints mySanctumProvider
#[derive(Debug, Parser)]
#[command(name = "courier")]
#[command(version)]
#[command(about = "Call configured HTTP API providers")]
struct Cli {
    /// Provider configuration file (.yaml, .yml, .toml or .json).
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Call a configured endpoint of a provider.
    Call {
        /// Provider name.
        provider: String,

        /// Endpoint name.
        endpoint: String,

        /// Request data as a JSON object.
        #[arg(long, value_parser = parse_data, value_name = "JSON")]
        data: Option<RequestData>,

        /// Bearer token, overriding the configured one.
        #[arg(long)]
        token: Option<String>,

        /// Http credential, overriding the configured ones (repeatable).
        #[arg(long = "credential", value_parser = parse_credential, value_name = "KEY=VALUE")]
        credentials: Vec<(String, String)>,

        /// Request timeout in seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Send a request to an arbitrary URL using a provider's authentication.
    Request {
        /// Provider name.
        provider: String,

        /// Lowercase HTTP verb: get, post, put, patch, delete or head.
        verb: String,

        /// Absolute request URL.
        url: String,

        /// Request data as a JSON object.
        #[arg(long, value_parser = parse_data, value_name = "JSON")]
        data: Option<RequestData>,
    },

    /// List a provider's endpoints with their resolved method and URL.
    Endpoints {
        /// Provider name.
        provider: String,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct ResponseOutput {
    status: u16,
    body: Value,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EndpointOutput {
    Resolved {
        name: String,
        method: String,
        url: String,
    },
    Failed {
        name: String,
        error: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Setup logging if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ConfigTree::load(&cli.config)?;
    let registry = ClientRegistry::new(Arc::new(config)).map_err(ApiError::from)?;

    match cli.command {
        Command::Call {
            provider,
            endpoint,
            data,
            token,
            credentials,
            timeout,
        } => {
            let client = registry.get(&provider)?;
            if let Some(token) = token {
                client.with_token(token);
            }
            if !credentials.is_empty() {
                client.with_credentials(credentials.into_iter().collect::<Credentials>());
            }
            if let Some(secs) = timeout {
                client.with_timeout(Duration::from_secs(secs));
            }

            let response = client
                .call_endpoint(&endpoint, data.unwrap_or_default())
                .await?;
            print_response(&response, cli.json)
        }
        Command::Request {
            provider,
            verb,
            url,
            data,
        } => {
            let client = registry.get(&provider)?;
            let response = client
                .dispatch(&verb, &url, data.unwrap_or_default())
                .await?;
            print_response(&response, cli.json)
        }
        Command::Endpoints { provider } => {
            let client = registry.get(&provider)?;
            let endpoints: Vec<EndpointOutput> = client
                .config()
                .endpoint_names()
                .into_iter()
                .map(|name| match client.endpoint(&name) {
                    Ok(resolved) => EndpointOutput::Resolved {
                        method: resolved.method().to_string(),
                        url: resolved.url().to_string(),
                        name,
                    },
                    Err(e) => EndpointOutput::Failed {
                        error: e.to_string(),
                        name,
                    },
                })
                .collect();

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&endpoints)?);
            } else {
                for endpoint in &endpoints {
                    match endpoint {
                        EndpointOutput::Resolved { name, method, url } => {
                            println!("{name}\t{}\t{url}", method.to_uppercase());
                        }
                        EndpointOutput::Failed { name, error } => {
                            println!("{name}\terror: {error}");
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

/// Prints a response and fails on a non-success status.
fn print_response(response: &ApiResponse, json: bool) -> Result<(), CliError> {
    if json {
        let body = response
            .json::<Value>()
            .unwrap_or_else(|_| Value::String(response.text()));
        let output = ResponseOutput {
            status: response.status(),
            body,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        eprintln!("HTTP {}", response.status());
        let text = response.text();
        if !text.is_empty() {
            println!("{text}");
        }
    }

    if response.is_success() {
        Ok(())
    } else {
        Err(CliError::Status(response.status()))
    }
}

/// Parses `--data` as a JSON object.
fn parse_data(s: &str) -> Result<RequestData, String> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("data must be a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

/// Parses a `KEY=VALUE` credential.
fn parse_credential(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}
