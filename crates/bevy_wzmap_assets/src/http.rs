//! HTTP backend client.

use std::time::Duration;

use bevy::prelude::*;
use bevy::tasks::{ConditionalSendFuture, IoTaskPool, TaskPool};
use serde_json::Value;

use crate::node::DataNode;
use crate::source::{AssetSource, SourceConfig, SourceError};

/// [`AssetSource`] talking to a running asset backend over HTTP.
///
/// Requests are blocking `ureq` calls offloaded onto Bevy's [`IoTaskPool`], so many
/// lookups can be in flight while the compiler awaits them.
#[derive(Clone, Debug)]
pub struct HttpSource {
    config: SourceConfig,
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new(config: SourceConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Self { config, agent }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(SourceConfig::default())
    }
}

impl AssetSource for HttpSource {
    fn fetch_node(
        &self,
        path: &str,
    ) -> impl ConditionalSendFuture<Output = Result<Option<DataNode>, SourceError>> {
        let agent = self.agent.clone();
        let url = self.config.json_url(path);
        let path = path.to_string();
        async move {
            IoTaskPool::get_or_init(TaskPool::new)
                .spawn(async move { fetch_json(&agent, &url, &path) })
                .await
        }
    }

    fn image_url(&self, path: &str) -> String {
        self.config.image_url(path)
    }

    fn prepare(&self, path: &str) -> impl ConditionalSendFuture<Output = Result<(), SourceError>> {
        let agent = self.agent.clone();
        let url = self.config.parse_url(path);
        let path = path.to_string();
        async move {
            IoTaskPool::get_or_init(TaskPool::new)
                .spawn(async move {
                    agent
                        .get(&url)
                        .call()
                        .map(drop)
                        .map_err(|e| request_error(&path, e))
                })
                .await
        }
    }
}

fn fetch_json(agent: &ureq::Agent, url: &str, path: &str) -> Result<Option<DataNode>, SourceError> {
    let response = match agent.get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(404, _)) => {
            debug!("Backend has no node at '{}'", path);
            return Ok(None);
        }
        Err(e) => return Err(request_error(path, e)),
    };

    let json: Value = response.into_json().map_err(|source| SourceError::Json {
        path: path.to_string(),
        source,
    })?;

    if json.is_null() {
        return Ok(None);
    }

    Ok(Some(DataNode::from_json(&json)?))
}

fn request_error(path: &str, error: ureq::Error) -> SourceError {
    match error {
        ureq::Error::Status(status, _) => SourceError::Status {
            path: path.to_string(),
            status,
        },
        ureq::Error::Transport(transport) => SourceError::Transport {
            path: path.to_string(),
            reason: transport.to_string(),
        },
    }
}
