//! Async worker - runs in the Tokio runtime and serves bridge commands

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::infrastructure::api::ExplorerApi;
use crate::infrastructure::channel::{run_channel, ChannelEvent};
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent, WorkerConfig};
use crate::session::page::load_page;
use crate::session::query::execute;

/// Run the async worker loop until `Shutdown` arrives or the TUI goes away
pub async fn run_async_worker(
    api: Arc<dyn ExplorerApi>,
    config: WorkerConfig,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    // One stop signal per joined topic
    let mut channels: HashMap<String, oneshot::Sender<()>> = HashMap::new();

    loop {
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(std::sync::mpsc::TryRecvError::Empty) => break,
                Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                    debug!("command channel closed");
                    return Ok(());
                }
            };

            match cmd {
                RuntimeCommand::Shutdown => {
                    info!(open_channels = channels.len(), "worker shutting down");
                    for (_, stop) in channels.drain() {
                        let _ = stop.send(());
                    }
                    return Ok(());
                }

                RuntimeCommand::LoadPage { seq, route } => {
                    let api = Arc::clone(&api);
                    let evt_tx = evt_tx.clone();
                    let page_size = config.page_size;
                    tokio::spawn(async move {
                        let outcome = load_page(api.as_ref(), &route, page_size).await;
                        let _ = evt_tx.send(RuntimeEvent::PageLoaded { seq, outcome });
                    });
                }

                RuntimeCommand::Fetch(command) => {
                    let api = Arc::clone(&api);
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        let result = execute(api.as_ref(), &command.request)
                            .await
                            .map_err(|err| err.to_string());
                        let _ = evt_tx.send(RuntimeEvent::Fetched {
                            key: command.key,
                            result,
                        });
                    });
                }

                RuntimeCommand::Subscribe { topic } => {
                    if channels.contains_key(&topic) {
                        continue;
                    }
                    let (stop_tx, stop_rx) = oneshot::channel();
                    channels.insert(topic.clone(), stop_tx);

                    let evt_tx = evt_tx.clone();
                    let channel = config.channel.clone();
                    tokio::spawn(async move {
                        let forward_topic = topic.clone();
                        run_channel(channel, topic, stop_rx, move |event| {
                            let event = match event {
                                ChannelEvent::Message(message) => RuntimeEvent::Live {
                                    topic: forward_topic.clone(),
                                    message,
                                },
                                ChannelEvent::Disconnected(reason) => RuntimeEvent::ChannelClosed {
                                    topic: forward_topic.clone(),
                                    reason,
                                },
                            };
                            let _ = evt_tx.send(event);
                        })
                        .await;
                    });
                }

                RuntimeCommand::Unsubscribe { topic } => {
                    if let Some(stop) = channels.remove(&topic) {
                        let _ = stop.send(());
                    }
                }

                RuntimeCommand::VerifyContract { address } => {
                    let api = Arc::clone(&api);
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        let event = match api.verify_contract(&address).await {
                            Ok(contract) => RuntimeEvent::ContractVerified { address, contract },
                            Err(err) => RuntimeEvent::Error {
                                message: format!("Verification failed: {}", err),
                            },
                        };
                        let _ = evt_tx.send(event);
                    });
                }
            }
        }

        // Small yield to prevent busy loop
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
