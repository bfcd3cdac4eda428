
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection, DistanceType, Table,
    query::{ExecutableQuery, QueryBase},
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ConsistencyLevel, DistanceMetric, StoreConfig};
use crate::embeddings::Embedder;
use crate::loader::DocumentChunk;
use crate::{RagError, Result};

/// A retrieved chunk with its search distance, ordered best-first by the
/// store.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub content: String,
    pub source: String,
    pub section_index: u32,
    pub distance: f32,
}

/// Capability interface for top-k retrieval, borrowed by the answer chain.
/// The chain never mutates the collection through it.
pub trait Retrieve {
    fn retrieve(&self, query: &str) -> impl Future<Output = Result<Vec<SearchResult>>> + Send;
}

/// Vector store over a local LanceDB database. Owns the connection and
/// table handle exclusively.
///
/// Lifecycle: uninitialized (no connection, no table binding) until either
/// `create_from_documents` or `load_existing` binds the collection; read
/// operations on an absent collection fail with
/// [`RagError::CollectionNotFound`] instead of creating it.
pub struct VectorStore {
    db_path: std::path::PathBuf,
    collection_name: String,
    distance: DistanceType,
    consistency: ConsistencyLevel,
    rebuild: bool,
    embedder: Arc<dyn Embedder>,
    connection: Option<Connection>,
    table: Option<Table>,
}

impl VectorStore {
    /// Construct the store without performing any I/O. The distance metric
    /// and consistency level are fixed here and cannot change after the
    /// collection is created.
    #[inline]
    pub fn new(config: &StoreConfig, embedder: Arc<dyn Embedder>, rebuild: bool) -> Self {
        Self {
            db_path: config.db_path.clone(),
            collection_name: config.collection_name.clone(),
            distance: distance_type(config.metric),
            consistency: config.consistency,
            rebuild,
            embedder,
            connection: None,
            table: None,
        }
    }

    /// Embed the given chunks and store them in the collection. Drops a
    /// pre-existing collection first when the rebuild flag is set; otherwise
    /// a pre-existing collection is bound as-is and the freshly loaded
    /// chunks are NOT inserted (the skipped insert is logged).
    #[inline]
    pub async fn create_from_documents(&mut self, chunks: &[DocumentChunk]) -> Result<()> {
        self.connect().await?;
        let connection = self.connection()?;

        let existing = table_names(connection).await?;
        if existing.contains(&self.collection_name) {
            if self.rebuild {
                connection
                    .drop_table(&self.collection_name)
                    .await
                    .map_err(|e| RagError::Store(format!("Failed to drop collection: {}", e)))?;
                info!("Dropped existing collection '{}'", self.collection_name);
            } else {
                let table = open_table(connection, &self.collection_name).await?;
                warn!(
                    "Collection '{}' already exists; {} loaded chunks were not inserted \
                     (rebuild disabled)",
                    self.collection_name,
                    chunks.len()
                );
                self.table = Some(table);
                return Ok(());
            }
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_many(&texts)?;
        if vectors.len() != chunks.len() {
            return Err(RagError::Store(format!(
                "Embedding count mismatch: {} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        // With no chunks to measure, the dimension comes from the canary
        // probe so the collection schema is still fixed-size.
        let dimension = match vectors.first() {
            Some(vector) => vector.len(),
            None => self.embedder.dimension()?,
        };

        let schema = build_schema(dimension);
        let table = connection
            .create_empty_table(&self.collection_name, schema.clone())
            .execute()
            .await
            .map_err(|e| RagError::Store(format!("Failed to create collection: {}", e)))?;

        if !chunks.is_empty() {
            let batch = build_record_batch(&schema, chunks, &vectors, dimension)?;
            let reader = RecordBatchIterator::new(std::iter::once(Ok(batch)), schema);
            table
                .add(reader)
                .execute()
                .await
                .map_err(|e| RagError::Store(format!("Failed to insert chunks: {}", e)))?;
        }

        info!(
            "Stored {} chunks in collection '{}'",
            chunks.len(),
            self.collection_name
        );
        self.table = Some(table);
        Ok(())
    }

    /// Bind to an already-built collection without modifying its contents.
    /// Fails if the collection does not exist, and never creates it as a
    /// side effect.
    #[inline]
    pub async fn load_existing(&mut self) -> Result<()> {
        debug!(
            "Loading existing collection '{}' from {}",
            self.collection_name,
            self.db_path.display()
        );
        self.connect().await?;
        let connection = self.connection()?;

        let existing = table_names(connection).await?;
        if !existing.contains(&self.collection_name) {
            return Err(RagError::CollectionNotFound(self.collection_name.clone()));
        }

        let table = open_table(connection, &self.collection_name).await?;
        self.table = Some(table);
        Ok(())
    }

    /// Return an owned search handle bound to the collection, lazily binding
    /// via `load_existing` if nothing is bound yet.
    #[inline]
    pub async fn get_retriever(&mut self, k: usize) -> Result<Retriever> {
        if self.table.is_none() {
            self.load_existing().await?;
        }
        let table = self.bound_table()?.clone();
        Ok(Retriever {
            table,
            embedder: Arc::clone(&self.embedder),
            distance: self.distance,
            k,
        })
    }

    /// Embed the query and return the k nearest chunks, best-first.
    #[inline]
    pub async fn similarity_search(&mut self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if self.table.is_none() {
            self.load_existing().await?;
        }
        let vector = self.embedder.embed_one(query)?;
        search_table(self.bound_table()?, &vector, self.distance, k).await
    }

    /// Number of records in the bound collection.
    #[inline]
    pub async fn count_records(&self) -> Result<usize> {
        self.bound_table()?
            .count_rows(None)
            .await
            .map_err(|e| RagError::Store(format!("Failed to count records: {}", e)))
    }

    async fn connect(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RagError::Store(format!("Failed to create database directory: {}", e))
            })?;
        }

        let uri = self.db_path.to_string_lossy().into_owned();
        debug!("Connecting to LanceDB at {}", uri);

        let mut builder = lancedb::connect(&uri);
        builder = match self.consistency {
            ConsistencyLevel::Strong => builder.read_consistency_interval(Duration::from_secs(0)),
            ConsistencyLevel::Bounded => builder.read_consistency_interval(Duration::from_secs(5)),
            ConsistencyLevel::Eventual => builder,
        };

        let connection = builder
            .execute()
            .await
            .map_err(|e| RagError::Store(format!("Failed to connect to LanceDB: {}", e)))?;

        self.connection = Some(connection);
        Ok(())
    }

    fn connection(&self) -> Result<&Connection> {
        self.connection
            .as_ref()
            .ok_or_else(|| RagError::Store("Vector store is not connected".to_string()))
    }

    fn bound_table(&self) -> Result<&Table> {
        self.table
            .as_ref()
            .ok_or_else(|| RagError::CollectionNotFound(self.collection_name.clone()))
    }
}

/// Search handle bound to one collection; cheap to clone and safe to use
/// without touching the owning store again.
#[derive(Clone)]
pub struct Retriever {
    table: Table,
    embedder: Arc<dyn Embedder>,
    distance: DistanceType,
    k: usize,
}

impl Retriever {
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }
}

impl Retrieve for Retriever {
    fn retrieve(&self, query: &str) -> impl Future<Output = Result<Vec<SearchResult>>> + Send {
        async move {
            let vector = self.embedder.embed_one(query)?;
            search_table(&self.table, &vector, self.distance, self.k).await
        }
    }
}

fn distance_type(metric: DistanceMetric) -> DistanceType {
    match metric {
        DistanceMetric::InnerProduct => DistanceType::Dot,
        DistanceMetric::Euclidean => DistanceType::L2,
    }
}

async fn table_names(connection: &Connection) -> Result<Vec<String>> {
    connection
        .table_names()
        .execute()
        .await
        .map_err(|e| RagError::Store(format!("Failed to list collections: {}", e)))
}

async fn open_table(connection: &Connection, name: &str) -> Result<Table> {
    connection
        .open_table(name)
        .execute()
        .await
        .map_err(|e| RagError::Store(format!("Failed to open collection: {}", e)))
}

fn build_schema(dimension: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, false)),
                dimension as i32,
            ),
            false,
        ),
        Field::new("content", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("section_index", DataType::UInt32, false),
    ]))
}

fn build_record_batch(
    schema: &Arc<Schema>,
    chunks: &[DocumentChunk],
    vectors: &[Vec<f32>],
    dimension: usize,
) -> Result<RecordBatch> {
    let ids: Vec<String> = chunks.iter().map(|_| Uuid::new_v4().to_string()).collect();
    let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
    let sources: Vec<&str> = chunks.iter().map(|c| c.source.as_str()).collect();
    let section_indices: Vec<u32> = chunks.iter().map(|c| c.section_index as u32).collect();

    let mut flat_values = Vec::with_capacity(chunks.len() * dimension);
    for vector in vectors {
        flat_values.extend_from_slice(vector);
    }
    let values = Float32Array::from(flat_values);
    let item_field = Arc::new(Field::new("item", DataType::Float32, false));
    let vector_array =
        FixedSizeListArray::try_new(item_field, dimension as i32, Arc::new(values), None)
            .map_err(|e| RagError::Store(format!("Failed to create vector array: {}", e)))?;

    let arrays: Vec<Arc<dyn arrow::array::Array>> = vec![
        Arc::new(StringArray::from(ids)),
        Arc::new(vector_array),
        Arc::new(StringArray::from(contents)),
        Arc::new(StringArray::from(sources)),
        Arc::new(UInt32Array::from(section_indices)),
    ];

    RecordBatch::try_new(Arc::clone(schema), arrays)
        .map_err(|e| RagError::Store(format!("Failed to create record batch: {}", e)))
}

async fn search_table(
    table: &Table,
    query_vector: &[f32],
    distance: DistanceType,
    limit: usize,
) -> Result<Vec<SearchResult>> {
    debug!("Searching collection with limit {}", limit);

    let mut stream = table
        .vector_search(query_vector)
        .map_err(|e| RagError::Store(format!("Failed to create vector search: {}", e)))?
        .distance_type(distance)
        .column("vector")
        .limit(limit)
        .execute()
        .await
        .map_err(|e| RagError::Store(format!("Failed to execute search: {}", e)))?;

    let mut results = Vec::new();
    while let Some(batch) = stream
        .try_next()
        .await
        .map_err(|e| RagError::Store(format!("Failed to read result stream: {}", e)))?
    {
        results.extend(parse_search_batch(&batch)?);
    }

    debug!("Search returned {} results", results.len());
    Ok(results)
}

fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<SearchResult>> {
    let contents = string_column(batch, "content")?;
    let sources = string_column(batch, "source")?;

    let section_indices = batch
        .column_by_name("section_index")
        .ok_or_else(|| RagError::Store("Missing section_index column".to_string()))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| RagError::Store("Invalid section_index column type".to_string()))?;

    let distances = batch
        .column_by_name("_distance")
        .map(|col| col.as_any().downcast_ref::<Float32Array>());

    let mut results = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let distance = distances
            .flatten()
            .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

        results.push(SearchResult {
            content: contents.value(row).to_string(),
            source: sources.value(row).to_string(),
            section_index: section_indices.value(row),
            distance,
        });
    }
    Ok(results)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| RagError::Store(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| RagError::Store(format!("Invalid {} column type", name)))
}
