//! CouchDB-backed room store.
//!
//! One document per room, keyed `room:<name>`. The engine's contract is
//! plain get/set of a whole JSON blob; CouchDB's revision bookkeeping
//! stays inside this adapter (fetch the current `_rev`, then put). A
//! revision conflict under concurrent writers maps to a store error
//! surfaced to the originating participant; last writer wins, as with
//! any other write.

use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use tilecast_protocol::{Room, RoomName};

use crate::{RoomStore, StoreConfig, StoreError};

fn room_doc_id(room: &RoomName) -> String {
    format!("room:{}", room.as_str())
}

/// The stored document: CouchDB metadata plus the room state flattened
/// alongside it.
#[derive(Debug, Serialize, Deserialize)]
struct RoomDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    rev: Option<String>,
    #[serde(flatten)]
    state: Room,
}

/// A [`RoomStore`] talking to an external CouchDB-compatible service.
#[derive(Clone)]
pub struct CouchRoomStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchRoomStore {
    /// Connects to the store and ensures the database exists.
    pub async fn connect(config: StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .build()
            .map_err(|source| StoreError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, self.database, path);
        let builder = self.client.request(method, url);
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    fn database_request(&self, method: Method) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, self.database);
        let builder = self.client.request(method, url);
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    async fn ensure_database(&self) -> Result<(), StoreError> {
        let key = self.database.to_string();
        let response = self
            .database_request(Method::GET)
            .send()
            .await
            .map_err(|source| StoreError::Request {
                key: key.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .database_request(Method::PUT)
                    .send()
                    .await
                    .map_err(|source| StoreError::Request {
                        key: key.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    tracing::info!(database = %self.database, "created store database");
                    Ok(())
                } else {
                    Err(StoreError::Status {
                        key,
                        status: create.status(),
                    })
                }
            }
            other => Err(StoreError::Status { key, status: other }),
        }
    }

    async fn get_document(&self, doc_id: &str) -> Result<Option<RoomDocument>, StoreError> {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| StoreError::Request {
                key: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let bytes = response.bytes().await.map_err(|source| StoreError::Request {
                    key: doc_id.to_string(),
                    source,
                })?;
                serde_json::from_slice(&bytes)
                    .map(Some)
                    .map_err(|source| StoreError::Corrupt {
                        key: doc_id.to_string(),
                        source,
                    })
            }
            other => Err(StoreError::Status {
                key: doc_id.to_string(),
                status: other,
            }),
        }
    }
}

impl RoomStore for CouchRoomStore {
    async fn get(&self, room: &RoomName) -> Result<Option<Room>, StoreError> {
        let doc_id = room_doc_id(room);
        Ok(self.get_document(&doc_id).await?.map(|doc| doc.state))
    }

    async fn set(&self, room: &RoomName, state: &Room) -> Result<(), StoreError> {
        let doc_id = room_doc_id(room);

        // Refresh the revision so the put lands on the current document.
        let rev = self
            .get_document(&doc_id)
            .await?
            .and_then(|existing| existing.rev);

        let doc = RoomDocument {
            id: doc_id.clone(),
            rev,
            state: state.clone(),
        };

        let response = self
            .request(Method::PUT, &doc_id)
            .json(&doc)
            .send()
            .await
            .map_err(|source| StoreError::Request {
                key: doc_id.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Status {
                key: doc_id,
                status: response.status(),
            })
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let key = self.database.to_string();
        let response = self
            .database_request(Method::GET)
            .send()
            .await
            .map_err(|source| StoreError::Request {
                key: key.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Status {
                key,
                status: response.status(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecast_protocol::ParticipantId;

    #[test]
    fn doc_id_is_prefixed_room_name() {
        assert_eq!(room_doc_id(&RoomName::new("table1")), "room:table1");
    }

    #[test]
    fn document_flattens_room_state() {
        let doc = RoomDocument {
            id: "room:table1".into(),
            rev: None,
            state: Room::seeded(ParticipantId::new("p1")),
        };
        let json: serde_json::Value = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["_id"], "room:table1");
        // No _rev on a fresh document.
        assert!(json.get("_rev").is_none());
        // Room fields sit beside the metadata, not nested under "state".
        assert_eq!(json["players"], serde_json::json!(["p1"]));
        assert!(json["boardData"].is_object());
    }

    #[test]
    fn document_round_trips_with_revision() {
        let raw = r#"{"_id":"room:t","_rev":"3-abc",
                      "players":["a","b"],
                      "boardData":{"event":"update","tiles":[],"center":{"x":1.0,"y":2.0},"trains":[]}}"#;
        let doc: RoomDocument = serde_json::from_str(raw).unwrap();

        assert_eq!(doc.rev.as_deref(), Some("3-abc"));
        assert_eq!(doc.state.players.len(), 2);
        assert_eq!(doc.state.board_data.center.y, 2.0);
    }
}
