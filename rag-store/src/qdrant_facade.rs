//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind the
//! [`VectorIndex`] trait, hiding the verbose builder pattern and keeping the
//! rest of the application decoupled from `qdrant-client`. Collections are
//! per dataset; entries carry a compact citation payload.

use async_trait::async_trait;
use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, FieldCondition, Filter, Match, PointId,
    PointStruct, SearchPointsBuilder, UpsertPointsBuilder, Value as QValue, Vector,
    VectorParamsBuilder, Vectors, condition::ConditionOneOf, r#match::MatchValue, value, vectors,
};
use tracing::{debug, info, warn};

use crate::config::{DistanceKind, RagConfig};
use crate::documents::{DocPayload, DocType};
use crate::errors::RagError;
use crate::index::{IndexEntry, ScoredHit, VectorIndex};

/// Qdrant-backed [`VectorIndex`].
pub struct QdrantIndex {
    client: Qdrant,
    distance: DistanceKind,
}

impl QdrantIndex {
    /// Creates a new facade from the given configuration.
    ///
    /// Uses the builder-based API of `qdrant-client` and supports optional
    /// API key authentication.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            distance: cfg.distance,
        })
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn collection_dim(&self, collection: &str) -> Result<Option<usize>, RagError> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if !exists {
            return Ok(None);
        }

        let info = self
            .client
            .collection_info(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let dim = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|c| match c {
                qdrant_client::qdrant::vectors_config::Config::Params(p) => Some(p.size as usize),
                _ => None,
            });
        Ok(dim)
    }

    async fn ensure_collection(&self, collection: &str, dim: usize) -> Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if exists {
            debug!("Collection '{}' already exists", collection);
            return Ok(());
        }

        let distance = match self.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
        };

        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(dim as u64, distance)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!("Collection '{}' created (dim={})", collection, dim);
        Ok(())
    }

    async fn clear(&self, collection: &str) -> Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if !exists {
            return Ok(());
        }
        self.client
            .delete_collection(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        info!("Collection '{}' dropped", collection);
        Ok(())
    }

    async fn upsert(&self, collection: &str, entries: Vec<IndexEntry>) -> Result<u64, RagError> {
        if entries.is_empty() {
            debug!("No entries provided for upsert");
            return Ok(0);
        }

        let count = entries.len() as u64;
        let points: Vec<PointStruct> = entries.into_iter().map(to_point).collect();

        info!(
            "Upserting {} points into collection '{}'",
            points.len(),
            collection
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(count)
    }

    async fn count(&self, collection: &str) -> Result<u64, RagError> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if !exists {
            return Ok(0);
        }
        let info = self
            .client
            .collection_info(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        top_k: u64,
        doc_type: Option<DocType>,
    ) -> Result<Vec<ScoredHit>, RagError> {
        if top_k == 0 {
            return Err(RagError::Validation("top_k must be > 0".into()));
        }

        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if !exists {
            return Ok(Vec::new());
        }

        let mut builder = SearchPointsBuilder::new(collection, vector, top_k).with_payload(true);
        if let Some(t) = doc_type {
            builder = builder.filter(doc_type_filter(t));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let mut out = Vec::with_capacity(res.result.len());
        for r in res.result.into_iter() {
            match hit_from_payload(r.score, r.payload) {
                Some(hit) => out.push(hit),
                None => warn!("dropping search hit with malformed payload"),
            }
        }

        // Qdrant ranks by score; re-sort to pin the tie-break on build order.
        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.payload.ordinal.cmp(&b.payload.ordinal))
        });

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }
}

// ---------- payload mapping ----------

fn to_point(e: IndexEntry) -> PointStruct {
    let mut payload: HashMap<String, QValue> = HashMap::new();
    payload.insert("text".into(), qstring(&e.text));
    payload.insert("dataset_id".into(), qstring(&e.payload.dataset_id));
    payload.insert("doc_type".into(), qstring(e.payload.doc_type.as_str()));
    payload.insert("ordinal".into(), qint(e.payload.ordinal as i64));
    if let Some(a) = e.payload.row_start {
        payload.insert("row_start".into(), qint(a as i64));
    }
    if let Some(b) = e.payload.row_end {
        payload.insert("row_end".into(), qint(b as i64));
    }

    let pid: PointId = e.doc_id.to_string().into();
    let vectors = Vectors {
        vectors_options: Some(vectors::VectorsOptions::Vector(Vector {
            data: e.vector,
            indices: None,
            vectors_count: None,
            vector: None,
        })),
    };

    PointStruct {
        id: Some(pid),
        payload,
        vectors: Some(vectors),
        ..Default::default()
    }
}

fn hit_from_payload(score: f32, p: HashMap<String, QValue>) -> Option<ScoredHit> {
    let text = get_str(&p, "text")?;
    let dataset_id = get_str(&p, "dataset_id")?;
    let doc_type = DocType::parse(&get_str(&p, "doc_type")?).ok()?;
    let ordinal = get_int(&p, "ordinal").unwrap_or(0) as usize;
    let row_start = get_int(&p, "row_start").map(|i| i as usize);
    let row_end = get_int(&p, "row_end").map(|i| i as usize);

    Some(ScoredHit {
        score,
        text,
        payload: DocPayload {
            dataset_id,
            doc_type,
            row_start,
            row_end,
            ordinal,
        },
    })
}

fn get_str(p: &HashMap<String, QValue>, key: &str) -> Option<String> {
    match p.get(key)?.kind.as_ref()? {
        value::Kind::StringValue(s) => Some(s.clone()),
        _ => None,
    }
}

fn get_int(p: &HashMap<String, QValue>, key: &str) -> Option<i64> {
    match p.get(key)?.kind.as_ref()? {
        value::Kind::IntegerValue(i) => Some(*i),
        _ => None,
    }
}

fn qstring(s: &str) -> QValue {
    QValue {
        kind: Some(value::Kind::StringValue(s.to_string())),
    }
}

fn qint(i: i64) -> QValue {
    QValue {
        kind: Some(value::Kind::IntegerValue(i)),
    }
}

/// Exact-match filter on the stored `doc_type` keyword.
fn doc_type_filter(t: DocType) -> Filter {
    let condition = Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: "doc_type".into(),
            r#match: Some(Match {
                match_value: Some(MatchValue::Keyword(t.as_str().to_string())),
            }),
            ..Default::default()
        })),
    };
    Filter {
        must: vec![condition],
        ..Default::default()
    }
}
