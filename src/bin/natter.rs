//! natter: line-oriented chat client.
//!
//! Connects to a natterd server, walks the password and login handshake
//! interactively, then mirrors the session: records from the server are
//! printed as they arrive while stdin lines are sent as `MSG` records.
//! `/quit` or `/exit` (and Ctrl-C) leave the chat cleanly.

use anyhow::Context as _;
use futures_util::{SinkExt, StreamExt};
use natter_proto::{Command, DEFAULT_PORT, LineCodec, Reply};
use std::io::Write as _;
use std::net::IpAddr;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = std::env::args();
    let prog = args.next().unwrap_or_else(|| "natter".to_string());

    let Some(host) = args.next() else {
        eprintln!("Usage: {prog} <server-ip> [port]");
        return ExitCode::FAILURE;
    };
    let port = match args.next() {
        Some(arg) => match arg.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                eprintln!("Usage: {prog} <server-ip> [port]");
                return ExitCode::FAILURE;
            }
        },
        None => DEFAULT_PORT,
    };
    let ip: IpAddr = match host.parse() {
        Ok(ip) => ip,
        Err(_) => {
            eprintln!("Invalid server IP");
            return ExitCode::FAILURE;
        }
    };

    match run(ip, port).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(ip: IpAddr, port: u16) -> anyhow::Result<ExitCode> {
    let stream = TcpStream::connect((ip, port))
        .await
        .with_context(|| format!("failed to connect to {ip}:{port}"))?;
    let mut framed = Framed::new(stream, LineCodec::new());
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    // Password gate: the server prompts until it accepts or gives up.
    loop {
        let Some(line) = framed.next().await.transpose()? else {
            println!("\n[Disconnected from server]");
            return Ok(ExitCode::FAILURE);
        };
        match Reply::parse(&line) {
            Some(Reply::Password) => {
                print!("Password: ");
                let _ = std::io::stdout().flush();
                let Some(password) = stdin.next_line().await? else {
                    return Ok(ExitCode::FAILURE);
                };
                framed.send(Command::Pass(password).to_string()).await?;
            }
            Some(Reply::OkPass) => break,
            _ => println!("{line}"),
        }
    }

    print!("Enter username: ");
    let _ = std::io::stdout().flush();
    let username = match stdin.next_line().await? {
        Some(line) => line.trim().to_string(),
        None => return Ok(ExitCode::FAILURE),
    };
    if username.is_empty() {
        println!("Empty username");
        return Ok(ExitCode::FAILURE);
    }

    framed
        .send(Command::Login(username.clone()).to_string())
        .await?;
    let Some(line) = framed.next().await.transpose()? else {
        println!("\n[Disconnected from server]");
        return Ok(ExitCode::FAILURE);
    };
    if Reply::parse(&line) != Some(Reply::Ok) {
        println!("Server response: {line}");
        return Ok(ExitCode::FAILURE);
    }
    println!("[Connected to chat as '{username}']");

    loop {
        tokio::select! {
            maybe = framed.next() => match maybe {
                Some(Ok(line)) => println!("{line}"),
                Some(Err(e)) => {
                    eprintln!("Read error: {e}");
                    break;
                }
                None => {
                    println!("\n[Disconnected from server]");
                    break;
                }
            },
            line = stdin.next_line() => match line? {
                Some(text) => {
                    if text.starts_with("/quit") || text.starts_with("/exit") {
                        framed.send(Command::Quit.to_string()).await?;
                        break;
                    }
                    framed.send(Command::Msg(text).to_string()).await?;
                }
                // Stdin closed; drop the connection without a QUIT record.
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                let _ = framed.send(Command::Quit.to_string()).await;
                break;
            }
        }
    }

    println!("Closed connection");
    Ok(ExitCode::SUCCESS)
}
