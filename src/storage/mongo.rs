//! MongoDB collection adapter.

use std::io;

use async_trait::async_trait;
use bson::{doc, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::{Client, Collection};

use super::DocumentStore;
use crate::error_handling::StoreError;

/// Writes batches into one MongoDB collection with `insertMany`.
#[derive(Debug, Clone)]
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    /// Wraps an existing collection handle.
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    /// Connects to `uri`, checks the server answers, and targets
    /// `db_name.collection_name`.
    pub async fn connect(
        uri: &str,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, StoreError> {
        log::info!("Connecting to MongoDB at {}", uri);

        let client = Client::with_uri_str(uri).await.map_err(classify_error)?;
        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(classify_error)?;

        log::info!("Connected to MongoDB database '{}'", db_name);
        Ok(Self::new(
            client.database(db_name).collection(collection_name),
        ))
    }

    /// The wrapped collection.
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    type Document = Document;

    async fn insert_many(&self, documents: &[Document]) -> Result<(), StoreError> {
        self.collection
            .insert_many(documents)
            .await
            .map(|_| ())
            .map_err(classify_error)
    }
}

/// Maps a driver error onto the retry taxonomy. Anything that is not a
/// socket or server-selection problem counts as a rejected write.
fn classify_error(error: MongoError) -> StoreError {
    match error.kind.as_ref() {
        ErrorKind::Io(io_error) if io_error.kind() == io::ErrorKind::TimedOut => {
            StoreError::NetworkTimeout(error.to_string())
        }
        ErrorKind::Io(_)
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => StoreError::ConnectionLost(error.to_string()),
        _ => StoreError::Rejected(error.to_string()),
    }
}
