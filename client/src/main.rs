use clap::Parser;
use client::machine::{Command, Snapshot};
use client::ws;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Play tic-tac-toe against another participant through the relay")]
struct Args {
    /// Base URL of the relay's HTTP API
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: String,
    #[arg(long, default_value_t = 0)]
    user_id: usize,
    /// Directory for the daily rolling log file
    #[arg(long, default_value = "./logs")]
    log_dir: String,
}

#[derive(Debug, PartialEq)]
enum Line {
    Command(Command),
    Quit,
    Unknown,
}

fn parse_line(line: &str) -> Line {
    match line.trim() {
        "play" => Line::Command(Command::RequestMatch),
        "again" => Line::Command(Command::Reset),
        "quit" | "exit" => Line::Quit,
        other => match other.parse::<usize>() {
            Ok(cell_index) => Line::Command(Command::SubmitMove(cell_index)),
            Err(_) => Line::Unknown,
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let file_appender = tracing_appender::rolling::daily(&args.log_dir, "client.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let registration = ws::register(&args.server, args.user_id).await?;
    info!("registered as {}", registration.id);

    let (command_sender, command_rcv) = mpsc::unbounded_channel();
    let (snapshot_sender, mut snapshot_rcv) = watch::channel(Snapshot::default());

    tokio::task::spawn(async move {
        let mut last: Option<Snapshot> = None;
        while snapshot_rcv.changed().await.is_ok() {
            let snapshot = snapshot_rcv.borrow_and_update().clone();
            if last.as_ref() != Some(&snapshot) {
                println!("{}", snapshot);
                last = Some(snapshot);
            }
        }
    });

    tokio::task::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_line(&line) {
                Line::Command(command) => {
                    if command_sender.send(command).is_err() {
                        break;
                    }
                }
                Line::Quit => break,
                Line::Unknown => println!("Commands: play, a cell number 0-8, again, quit"),
            }
        }
    });

    let result = ws::run(registration, command_rcv, snapshot_sender).await;
    println!("{}", exit_notice(&result));
    // A pending stdin read holds runtime shutdown until the next line
    drop(guard);
    std::process::exit(if result.is_ok() { 0 } else { 1 });
}

fn exit_notice(result: &Result<(), ws::ConnectError>) -> String {
    match result {
        Ok(()) => "Relay disconnected, exiting".to_string(),
        Err(e) => format!("Lost the relay connection: {}", e),
    }
}
