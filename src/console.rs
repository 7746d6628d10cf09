//! Operator console: line commands on stdin, session events on stdout.

use rl_core::link::{ConnectionOrigin, SessionEvent};
use rl_core::protocol::{
    Heading, InvalidHeading, Movement, ObstacleBuffer, ObstaclePlacement, OutboundCommand,
    UnknownMovement,
};
use rl_core::ports::{DiscoveryEvent, DiscoveryPort};
use rl_core::{PeerAddress, SendOutcome};
use thiserror::Error;
use tracing::debug;

use crate::bootstrap::LinkRuntime;

pub const HELP: &str = "\
commands:
  /peers                 trusted and configured peers
  /scan                  discover nearby peers
  /connect <address>     pair if needed and connect
  /listen                wait for the robot to connect
  /disconnect            drop the link
  /start | /stop         run control
  /robot <col> <row> <N|E|S|W>
  /obs <id> <col> <row> <N|E|S|W>   buffer an obstacle
  /sendobs               send buffered obstacles
  /move <fd|bd|fl|fr|bl|br> [amount]
  /state                 session status
  /quit
anything else is sent as a text record";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Peers,
    Scan,
    Connect(PeerAddress),
    Listen,
    Disconnect,
    Start,
    Stop,
    Robot {
        col: i32,
        row: i32,
        heading: Heading,
    },
    Obstacle(ObstaclePlacement),
    SendObstacles,
    Move(Movement, u32),
    State,
    Quit,
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}` (try /help)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Heading(#[from] InvalidHeading),

    #[error(transparent)]
    Movement(#[from] UnknownMovement),
}

fn int(arg: Option<&str>, usage: &'static str) -> Result<i32, CommandError> {
    arg.and_then(|a| a.parse().ok())
        .ok_or(CommandError::Usage(usage))
}

/// Parse one console line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if !line.starts_with('/') {
        return Ok(Some(Command::Text(line.to_string())));
    }

    let mut args = line.split_whitespace();
    let name = args.next().unwrap_or_default().to_ascii_lowercase();
    let command = match name.as_str() {
        "/help" | "/?" => Command::Help,
        "/peers" => Command::Peers,
        "/scan" => Command::Scan,
        "/connect" => {
            let address = args.next().ok_or(CommandError::Usage("/connect <address>"))?;
            Command::Connect(PeerAddress::new(address))
        }
        "/listen" => Command::Listen,
        "/disconnect" => Command::Disconnect,
        "/start" => Command::Start,
        "/stop" => Command::Stop,
        "/robot" => {
            const USAGE: &str = "/robot <col> <row> <N|E|S|W>";
            let col = int(args.next(), USAGE)?;
            let row = int(args.next(), USAGE)?;
            let heading: Heading = args.next().ok_or(CommandError::Usage(USAGE))?.parse()?;
            Command::Robot { col, row, heading }
        }
        "/obs" => {
            const USAGE: &str = "/obs <id> <col> <row> <N|E|S|W>";
            let id = int(args.next(), USAGE)?;
            let col = int(args.next(), USAGE)?;
            let row = int(args.next(), USAGE)?;
            let heading: Heading = args.next().ok_or(CommandError::Usage(USAGE))?.parse()?;
            Command::Obstacle(ObstaclePlacement {
                id,
                col,
                row,
                heading,
            })
        }
        "/sendobs" => Command::SendObstacles,
        "/move" => {
            const USAGE: &str = "/move <fd|bd|fl|fr|bl|br> [amount]";
            let movement: Movement = args.next().ok_or(CommandError::Usage(USAGE))?.parse()?;
            let amount = match args.next() {
                Some(amount) => amount.parse().map_err(|_| CommandError::Usage(USAGE))?,
                None => movement.default_amount(),
            };
            Command::Move(movement, amount)
        }
        "/state" => Command::State,
        "/quit" | "/exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// One line describing a session event for the operator.
pub fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::StateChanged { to, .. } => format!("[link] {to}"),
        SessionEvent::PairingStateChanged { peer, state } => format!("[pairing] {peer}: {state}"),
        SessionEvent::Connected { peer, origin, .. } => {
            let how = match origin {
                ConnectionOrigin::Negotiated(strategy) => format!("via {strategy}"),
                ConnectionOrigin::Accepted => "peer called back".to_string(),
                ConnectionOrigin::Redialed(strategy) => format!("redialed via {strategy}"),
            };
            format!("[link] connected to {peer} ({how})")
        }
        SessionEvent::ConnectFailed { error, .. } => format!("[link] connect failed: {error}"),
        SessionEvent::LinkLost { peer, reason, .. } => format!("[link] lost {peer}: {reason}"),
        SessionEvent::Inbound { message, .. } => format!("[robot] {message}"),
        SessionEvent::MalformedRecord { record, reason, .. } => {
            format!("[robot] dropped `{record}`: {reason}")
        }
        SessionEvent::RunModeReset => "[robot] run stopped".to_string(),
    }
}

/// Whether the console keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console {
    runtime: LinkRuntime,
    obstacles: ObstacleBuffer,
}

impl Console {
    pub fn new(runtime: LinkRuntime) -> Self {
        Self {
            runtime,
            obstacles: ObstacleBuffer::new(),
        }
    }

    pub fn runtime(&self) -> &LinkRuntime {
        &self.runtime
    }

    pub async fn execute(&mut self, command: Command) -> anyhow::Result<Flow> {
        match command {
            Command::Help => println!("{HELP}"),
            Command::Peers => self.print_peers().await?,
            Command::Scan => self.scan().await?,
            Command::Connect(address) => {
                let peer = self.runtime.directory.identity(&address);
                println!("connecting to {peer}");
                let manager = self.runtime.manager.clone();
                // Outcome is reported through session events.
                tokio::spawn(async move {
                    if let Err(err) = manager.connect(peer).await {
                        debug!(error = %err, "Connect request ended");
                    }
                });
            }
            Command::Listen => self.runtime.manager.listen().await?,
            Command::Disconnect => self.runtime.manager.disconnect().await,
            Command::Start => self.send(OutboundCommand::start()).await,
            Command::Stop => self.send(OutboundCommand::stop()).await,
            Command::Robot { col, row, heading } => {
                self.send(OutboundCommand::robot_pose(col, row, heading))
                    .await
            }
            Command::Obstacle(placement) => {
                self.obstacles.record(placement);
                println!(
                    "buffered obstacle {} ({} pending)",
                    placement.id,
                    self.obstacles.len()
                );
            }
            Command::SendObstacles => match self.obstacles.combined_command() {
                Some(batch) => self.send(batch).await,
                None => println!("no obstacles buffered"),
            },
            Command::Move(movement, amount) => {
                self.send(OutboundCommand::movement(movement, amount))
                    .await
            }
            Command::State => {
                let status = self.runtime.manager.status().await;
                match (&status.peer, &status.session_id) {
                    (Some(peer), Some(session_id)) => {
                        println!("{} with {peer} (session {session_id})", status.state)
                    }
                    _ => println!("{}", status.state),
                }
                if let Some(last) = &status.last_peer {
                    println!("last peer: {last}");
                }
            }
            Command::Quit => return Ok(Flow::Quit),
            Command::Text(text) => {
                if let Some(record) = OutboundCommand::free_text(&text) {
                    self.send(record).await;
                }
            }
        }
        Ok(Flow::Continue)
    }

    async fn send(&self, command: OutboundCommand) {
        match self.runtime.manager.send(&command).await {
            SendOutcome::Sent => println!("> {command}"),
            SendOutcome::NotConnected => println!("not connected, `{command}` dropped"),
            SendOutcome::LinkLost => println!("link lost while sending `{command}`"),
        }
    }

    async fn print_peers(&self) -> anyhow::Result<()> {
        let trusted = self.runtime.discovery.trusted_peers().await?;
        println!("trusted:");
        for peer in &trusted {
            println!("  {peer}");
        }
        println!("configured:");
        for entry in self.runtime.directory.entries() {
            println!("  {}", entry.identity());
        }
        Ok(())
    }

    async fn scan(&self) -> anyhow::Result<()> {
        let mut found = self.runtime.discovery.start_scan().await?;
        println!("scanning...");
        tokio::spawn(async move {
            while let Some(event) = found.recv().await {
                match event {
                    DiscoveryEvent::PeerFound(peer) => println!("[scan] found {peer}"),
                    DiscoveryEvent::ScanFinished => println!("[scan] finished"),
                }
            }
        });
        Ok(())
    }
}
