//! Line-delimited JSON transport.
//!
//! Every input line is one inbound event:
//!
//! ```text
//! {"key": "111:222", "event": {"type": "choose_language", "language": "ru"}}
//! ```
//!
//! and every output line is a [`Reply`]. Lines are handled in order; the
//! handler's per-key lock still serializes events that other transports
//! deliver for the same chat.

use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;

use crate::application::{HandleEventCommand, HandleEventError, HandleEventHandler, SessionStore};
use crate::domain::conversation::{ConversationEvent, RenderDirective};
use crate::domain::foundation::SessionKey;

/// One inbound line.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEvent {
    pub key: SessionKey,
    pub event: ConversationEvent,
}

/// One outbound line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    Rendered {
        key: SessionKey,
        directive: RenderDirective,
        #[serde(skip_serializing_if = "Option::is_none")]
        order_id: Option<String>,
    },
    Rejected {
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<SessionKey>,
        error: String,
        /// Set when the order went through even though the event failed.
        #[serde(skip_serializing_if = "Option::is_none")]
        order_id: Option<String>,
    },
}

/// Feeds JSON lines from a reader into the event handler.
pub struct JsonLinesTransport {
    handler: Arc<HandleEventHandler>,
    store: Arc<SessionStore>,
}

impl JsonLinesTransport {
    pub fn new(handler: Arc<HandleEventHandler>, store: Arc<SessionStore>) -> Self {
        Self { handler, store }
    }

    /// Serves until the reader is exhausted or shutdown carries `true`.
    pub async fn serve<R, W>(
        &self,
        reader: R,
        mut writer: W,
        mut shutdown: watch::Receiver<bool>,
    ) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }

                    let reply = self.dispatch(&line).await;
                    let mut encoded = serde_json::to_vec(&reply).map_err(io::Error::other)?;
                    encoded.push(b'\n');
                    writer.write_all(&encoded).await?;
                    writer.flush().await?;
                }
            }
        }

        tracing::info!("Transport stopped");
        Ok(())
    }

    /// Handles one raw line.
    pub async fn dispatch(&self, line: &str) -> Reply {
        let inbound: InboundEvent = match serde_json::from_str(line) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed inbound event");
                return Reply::Rejected {
                    key: None,
                    error: format!("malformed event: {}", e),
                    order_id: None,
                };
            }
        };

        let key = inbound.key;
        let command = HandleEventCommand {
            key,
            event: inbound.event,
        };

        match self.handler.handle(command).await {
            Ok(outcome) => Reply::Rendered {
                key,
                directive: outcome.transition.directive,
                order_id: outcome.receipt.map(|receipt| receipt.order_id),
            },
            Err(HandleEventError::PersistFailedAfterOrder {
                receipt, session, ..
            }) => match self.store.save(key, &session).await {
                Ok(stored) => {
                    tracing::info!(%key, order_id = %receipt.order_id, "Recovered session after order");
                    Reply::Rendered {
                        key,
                        directive: self.handler.render_session(&stored),
                        order_id: Some(receipt.order_id),
                    }
                }
                Err(e) => {
                    tracing::error!(%key, order_id = %receipt.order_id, error = %e, "Session lost after order");
                    Reply::Rejected {
                        key: Some(key),
                        error: e.to_string(),
                        order_id: Some(receipt.order_id),
                    }
                }
            },
            Err(e) => Reply::Rejected {
                key: Some(key),
                error: e.to_string(),
                order_id: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryCatalog, InMemorySessionStorage, RecordingOrderGateway};
    use crate::application::SessionStoreConfig;
    use crate::domain::compaction::SessionOptimizer;
    use crate::domain::conversation::{Scene, SceneMachine};

    fn transport() -> (JsonLinesTransport, InMemorySessionStorage) {
        let storage = InMemorySessionStorage::new();
        let store = Arc::new(SessionStore::new(
            Arc::new(storage.clone()),
            SessionOptimizer::default(),
            SessionStoreConfig::default(),
        ));
        let handler = Arc::new(HandleEventHandler::new(
            Arc::clone(&store),
            Arc::new(InMemoryCatalog::demo()),
            Arc::new(RecordingOrderGateway::new()),
            SceneMachine::default(),
        ));
        (JsonLinesTransport::new(handler, store), storage)
    }

    #[tokio::test]
    async fn dispatch_renders_next_scene() {
        let (transport, _) = transport();

        let reply = transport
            .dispatch(r#"{"key":"111:222","event":{"type":"choose_language","language":"ru"}}"#)
            .await;

        match reply {
            Reply::Rendered { key, directive, order_id } => {
                assert_eq!(key, SessionKey::new(111, 222));
                assert_eq!(directive.scene, Scene::Registration);
                assert_eq!(order_id, None);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn dispatch_rejects_malformed_lines() {
        let (transport, _) = transport();

        let reply = transport.dispatch(r#"{"key":"not-a-key","event":{}}"#).await;

        assert!(matches!(reply, Reply::Rejected { key: None, .. }));
    }

    #[tokio::test]
    async fn dispatch_surfaces_storage_failures() {
        let (transport, storage) = transport();
        storage.fail_writes(true);

        let reply = transport
            .dispatch(r#"{"key":"1:1","event":{"type":"restart"}}"#)
            .await;

        assert!(matches!(
            reply,
            Reply::Rejected { key: Some(_), order_id: None, .. }
        ));
    }

    #[tokio::test]
    async fn serve_answers_each_line_until_eof() {
        let (transport, _) = transport();
        let input = concat!(
            r#"{"key":"1:1","event":{"type":"choose_language","language":"en"}}"#,
            "\n\n",
            r#"{"key":"2:2","event":{"type":"restart"}}"#,
            "\n",
        );
        let mut output = Vec::new();
        let (_tx, rx) = watch::channel(false);

        transport.serve(input.as_bytes(), &mut output, rx).await.unwrap();

        let replies: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["status"], "rendered");
        assert_eq!(replies[0]["directive"]["scene"], "registration");
        assert_eq!(replies[1]["key"], "2:2");
        assert_eq!(replies[1]["directive"]["scene"], "language_select");
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let (transport, _) = transport();
        let (reader, _keep_open) = tokio::io::duplex(64);
        let (tx, rx) = watch::channel(false);

        let serving = tokio::spawn(async move {
            transport
                .serve(tokio::io::BufReader::new(reader), tokio::io::sink(), rx)
                .await
        });
        tx.send(true).unwrap();

        assert!(serving.await.unwrap().is_ok());
    }
}
