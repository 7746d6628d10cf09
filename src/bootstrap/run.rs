use rl_core::RoboLinkConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::wiring::wire_link;
use crate::console::{describe, parse_command, Console, Flow, HELP};

/// Wire the link and run the console until `/quit`, end of input or Ctrl-C.
pub async fn run_app(config: RoboLinkConfig) -> anyhow::Result<()> {
    let runtime = wire_link(&config);
    let manager = runtime.manager.clone();

    let mut events = manager.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("{}", describe(&event));
        }
    });

    info!(peers = config.peers.len(), "RoboLink ready");
    println!("{HELP}");

    let mut console = Console::new(runtime);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };
        let Some(line) = line else { break };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match console.execute(command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => warn!(error = %format!("{err:#}"), "Command failed"),
        }
    }

    manager.shutdown().await;
    // The event stream ends once the session has shut down.
    if let Err(err) = printer.await {
        warn!(error = %err, "Event printer ended abnormally");
    }
    Ok(())
}
