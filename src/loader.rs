//! Dataset loader.
//!
//! Fetches and decodes the large universe data file off the caller's thread,
//! then reshapes the record list into a name-keyed map for O(1) lookup.
//! Stateless across invocations: every `LoadData` command runs one
//! independent cycle from scratch and answers with exactly one event.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::messages::{LoaderCommand, LoaderEvent};
use crate::model::{key_by_name, KeyedDataset, StarSystem};

/// Background dataset loader.
pub struct DataLoader {
    config: LoaderConfig,
    client: reqwest::Client,
}

impl DataLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Spawn the loader reactor. Commands are handled one at a time, to
    /// completion; the loop ends when the command channel closes or the
    /// caller drops the event receiver.
    pub fn spawn(
        self,
        rx: mpsc::Receiver<LoaderCommand>,
        tx: mpsc::Sender<LoaderEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(rx, tx))
    }

    async fn run(self, mut rx: mpsc::Receiver<LoaderCommand>, tx: mpsc::Sender<LoaderEvent>) {
        while let Some(command) = rx.recv().await {
            match command {
                LoaderCommand::LoadData => {
                    let event = match self.load_data().await {
                        Ok(data) => {
                            tracing::info!(systems = data.len(), "Dataset loaded");
                            LoaderEvent::Success { data }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Dataset load failed");
                            LoaderEvent::Error {
                                error: e.to_string(),
                            }
                        }
                    };
                    if tx.send(event).await.is_err() {
                        tracing::debug!("Loader event receiver dropped; stopping");
                        return;
                    }
                }
            }
        }
    }

    /// One full load cycle: fetch, decode, reduce. Never returns a partial
    /// dataset; any failure along the way is the cycle's single error.
    pub async fn load_data(&self) -> Result<KeyedDataset, LoadError> {
        let response = self
            .client
            .get(self.config.dataset_url.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let records: Vec<StarSystem> = serde_json::from_str(&body)?;

        Ok(key_by_name(records))
    }
}
