//! courier shell binary.
//!
//! Thin line-oriented front end over the protocol engine: it parses the
//! endpoint arguments, reads commands from stdin, and renders each
//! operation's report. All protocol behavior lives in `courier-client`.
//!
//! # Usage
//!
//! ```bash
//! courier -s chat.example.org -p 2137
//! ```
//!
//! Commands: `register <alias> <dd-mm-yyyy> <full name…>`, `unregister`,
//! `connect`, `disconnect`, `send <dest> <text…>`,
//! `sendattach <dest> <text…> <file>`, `users`, `quit`.

// stdout is the UI of this shell.
#![allow(clippy::print_stdout)]

use chrono::NaiveDate;
use clap::Parser;
use courier_client::{ConnectionEndpoint, Engine, Registration, Report};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// courier presence/messaging client
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Presence and messaging client shell")]
#[command(version)]
struct Args {
    /// Server IP
    #[arg(short = 's', long, default_value = "localhost")]
    server_ip: String,

    /// Server port
    #[arg(short = 'p', long, default_value_t = ConnectionEndpoint::DEFAULT_SERVER_PORT)]
    server_port: u16,

    /// Host IP advertised to peers
    #[arg(short = 'c', long, default_value = "localhost")]
    client_ip: String,

    /// Port this client advertises for peer delivery
    #[arg(long, default_value_t = ConnectionEndpoint::DEFAULT_CLIENT_PORT)]
    client_port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let endpoint =
        ConnectionEndpoint::new(args.server_ip, args.server_port, args.client_ip, args.client_port)?;
    tracing::info!(server = %endpoint.server_addr(), "courier shell starting");
    let mut engine = Engine::new(endpoint);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") {
            break;
        }
        dispatch(&mut engine, line).await;
    }

    Ok(())
}

/// Run one shell command against the engine and render its report.
async fn dispatch(engine: &mut Engine, line: &str) {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return;
    };
    let rest: Vec<&str> = words.collect();

    match verb.to_ascii_lowercase().as_str() {
        "register" => match parse_registration(&rest) {
            Some(form) => {
                println!("c> REGISTER {}", form.alias);
                render(&engine.register(form).await);
            },
            None => println!("Syntax error. Insert <alias> <dd-mm-yyyy> <full name>"),
        },
        "unregister" => {
            println!("c> UNREGISTER");
            render(&engine.unregister().await);
        },
        "connect" => {
            println!("c> CONNECT");
            render(&engine.connect().await);
        },
        "disconnect" => {
            println!("c> DISCONNECT");
            render(&engine.disconnect().await);
        },
        "send" => match rest.split_first() {
            Some((dest, text)) if !text.is_empty() => {
                let message = text.join(" ");
                println!("c> SEND {dest} {message}");
                render(&engine.send_message(dest, &message).await);
            },
            _ => println!("Syntax error. Insert <destUser> <message>"),
        },
        "sendattach" => match parse_sendattach(&rest) {
            Some((dest, message, file)) => {
                println!("c> SENDATTACH {dest} {message} {file}");
                render(&engine.send_attachment(&dest, &message, &file).await);
            },
            None => println!("Syntax error. Insert <destUser> <message> <attachedFile>"),
        },
        "users" => {
            println!("c> CONNECTEDUSERS");
            render(&engine.connected_users().await);
        },
        _ => println!("Unknown command: {verb}"),
    }
}

/// Parse `sendattach <dest> <message…> <file>`.
///
/// The file path is the last token so the message may contain spaces.
fn parse_sendattach(rest: &[&str]) -> Option<(String, String, String)> {
    let [dest, middle @ .., file] = rest else {
        return None;
    };
    if middle.is_empty() {
        return None;
    }

    Some(((*dest).to_owned(), middle.join(" "), (*file).to_owned()))
}

/// Parse `register <alias> <dd-mm-yyyy> <full name…>`.
fn parse_registration(rest: &[&str]) -> Option<Registration> {
    let [alias, date, name @ ..] = rest else {
        return None;
    };
    if name.is_empty() {
        return None;
    }
    let birth_date = NaiveDate::parse_from_str(date, "%d-%m-%Y").ok()?;

    Some(Registration {
        username: name.join(" "),
        alias: (*alias).to_owned(),
        birth_date,
    })
}

/// Print one report the way the server pane renders it.
fn render(report: &Report) {
    if report.timed_out {
        println!("!> timeout, no data received from the server");
    }
    println!("s> {}", report.line);
}
