use std::io::{self, Write};
use std::time::Duration;

use clap::Parser;

use env_logger::Env;
use rpassword::read_password;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use source_rcon::{RconClient, RconClientConfig};

mod configs;
use crate::configs::{load_config_from_env, ServerConfig, DEFAULT_PORT};

const HISTORY_FILE: &str = "history.txt";

#[derive(Parser)]
#[command(version, about = "Send commands to a Source engine server over RCON")]
struct Args {
    /// Server host name or IP (eg: 127.0.0.1, or localhost)
    #[arg(short, long)]
    address: Option<String>,

    /// Server RCON port
    #[arg(long)]
    port: Option<u16>,

    /// Server password. Pass an empty string for servers without one
    #[arg(short, long)]
    password: Option<String>,

    /// The command to execute. Starts an interactive shell when omitted
    #[arg(short, long)]
    command: Option<String>,

    /// How many times a failed command is retried after reconnecting
    #[arg(long)]
    retries: Option<usize>,

    /// Seconds to wait before each reconnect
    #[arg(long)]
    retry_delay: Option<u64>,

    /// Seconds to wait for the server on connect, read and write
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    #[arg(long, action = clap::ArgAction::SetTrue)]
    show_responses: bool,

    /// Config name to load from RCON_CONFIG_PATH
    #[arg(long)]
    config_name: Option<String>,
}

async fn run_cli(mut client: RconClient, show_responses: bool) -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;

    if rl.load_history(HISTORY_FILE).is_err() {
        log::info!("No previous history.");
    }

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match client.execute(line).await {
                    Ok(resp) if show_responses => log::info!("Response: {:?}", resp),
                    Ok(resp) => println!("{}", resp),
                    Err(e) => log::error!("Error: {}", e),
                }
            },
            Err(ReadlineError::Interrupted) => {
                log::info!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                log::info!("CTRL-D");
                break;
            },
            Err(err) => {
                log::error!("Error: {:?}", err);
                break;
            }
        }
    }

    client.close();
    rl.save_history(HISTORY_FILE).unwrap_or_else(|e| log::error!("Failed to save history: {}", e));
    Ok(())
}

fn prompt_address(provided_addr: Option<String>) -> io::Result<String> {
    if let Some(addr) = provided_addr {
        return Ok(addr);
    }
    print!("Enter address: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_password(provided_pw: Option<String>) -> io::Result<String> {
    if let Some(pw) = provided_pw {
        return Ok(pw);
    }
    print!("Enter password: ");
    io::stdout().flush()?;
    read_password()
}

fn build_client_config(args: &Args, server: ServerConfig) -> RconClientConfig {
    let retries = args.retries.or(server.retries).unwrap_or(3);
    let retry_delay = args.retry_delay.or(server.retry_delay).unwrap_or(0);
    let timeout = Duration::from_secs(args.timeout);

    RconClientConfig::new(server.host, server.port, server.password)
        .max_retries(retries)
        .retry_delay_secs(retry_delay)
        .io_timeout(timeout)
        .connect_timeout(timeout)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    env_logger::Builder::from_env(
        Env::default().filter_or("RUST_LOG", "info")
    ).init();

    let searched_cfg = match args.config_name.clone() {
        Some(name) => {
            log::debug!("Config name provided: {}", name);
            load_config_from_env(Some(name))
        }
        None if args.address.is_none() => load_config_from_env(None),
        None => None,
    };

    let server_config = match searched_cfg {
        Some(cfg) => cfg,
        None => ServerConfig {
            host: prompt_address(args.address.clone())?,
            port: args.port.unwrap_or(DEFAULT_PORT),
            password: prompt_password(args.password.clone())?,
            retries: None,
            retry_delay: None,
        },
    };

    let mut client = RconClient::new(build_client_config(&args, server_config));

    if let Err(e) = client.connect().await {
        if e.is_auth_rejection() || client.config().max_retries == 0 {
            return Err(e.into());
        }
        log::warn!("Initial connect failed, will retry on first command: {}", e);
    }

    match args.command.as_deref() {
        Some(cmd) => {
            let token = client.cancellation_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            });

            let response = client.execute(cmd).await?;
            println!("{}", response);
            client.close();
        }
        None => run_cli(client, args.show_responses).await?,
    }
    Ok(())
}
