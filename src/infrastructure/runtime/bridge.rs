//! Runtime bridge - connects the sync TUI thread with the async Tokio runtime
//!
//! The TUI never awaits. It sends [`RuntimeCommand`]s and drains
//! [`RuntimeEvent`]s once per frame; the worker thread owns the runtime, the
//! HTTP client and every live channel.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use tokio::runtime::Builder;
use tracing::error;

use crate::domain::list::ContractInfo;
use crate::domain::Route;
use crate::infrastructure::api::ExplorerApi;
use crate::infrastructure::channel::ChannelConfig;
use crate::infrastructure::runtime::worker::run_async_worker;
use crate::session::live::LiveMessage;
use crate::session::page::PageOutcome;
use crate::session::query::{FetchCommand, QueryKey, QueryResult};

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCommand {
    /// Load a detail page. `seq` identifies the navigation that asked for it.
    LoadPage { seq: u64, route: Route },
    /// Run one query for the open page
    Fetch(FetchCommand),
    /// Join a live channel topic
    Subscribe { topic: String },
    /// Leave a live channel topic
    Unsubscribe { topic: String },
    /// Ask the backend to verify a contract against Sourcify
    VerifyContract { address: String },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    PageLoaded { seq: u64, outcome: PageOutcome },
    Fetched { key: QueryKey, result: QueryResult },
    Live { topic: String, message: LiveMessage },
    ChannelClosed { topic: String, reason: String },
    ContractVerified {
        address: String,
        contract: Option<ContractInfo>,
    },
    Error { message: String },
}

/// Worker settings fixed at startup
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub channel: ChannelConfig,
    pub page_size: u32,
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    pub fn new(api: Arc<dyn ExplorerApi>, config: WorkerConfig) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let rt = Builder::new_multi_thread()
            .enable_all()
            .thread_name("gwscope-worker")
            .build()
            .context("failed to create Tokio runtime")?;

        thread::Builder::new()
            .name("gwscope-runtime".into())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) = run_async_worker(api, config, cmd_rx, evt_tx.clone()).await {
                        error!(error = %err, "worker exited");
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })
            .context("failed to spawn runtime thread")?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
