//! Document builder: turns dataset rows into retrievable documents.
//!
//! Output is a deterministic, ordered sequence: exactly one summary document
//! (schema description + aggregate stats) followed by row documents covering
//! the first `min(row_count, max_rows)` rows in original order, `rows_per_doc`
//! rows per document. Row batches whose rendered text exceeds the character
//! budget are split in half recursively, never silently truncated.
//!
//! Re-running the builder on an unchanged dataset with unchanged parameters
//! yields identical ids and text, which is what makes re-indexing idempotent.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use dataset_store::{DatasetMeta, Row};

use crate::errors::RagError;
use crate::ids::stable_uuid;

/// Kind of retrievable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    /// Singular dataset-level summary.
    Summary,
    /// One batch of consecutive rows.
    Rows,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Summary => "summary",
            DocType::Rows => "rows",
        }
    }

    /// Parses a wire name, for request validation.
    pub fn parse(s: &str) -> Result<Self, RagError> {
        match s {
            "summary" => Ok(DocType::Summary),
            "rows" => Ok(DocType::Rows),
            other => Err(RagError::Validation(format!("unknown doc_type: {other}"))),
        }
    }
}

/// Citation-bearing metadata stored alongside each vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocPayload {
    pub dataset_id: String,
    pub doc_type: DocType,
    /// Inclusive first row index covered (row documents only).
    pub row_start: Option<usize>,
    /// Inclusive last row index covered (row documents only).
    pub row_end: Option<usize>,
    /// Build-order position, used as the deterministic tie-breaker.
    pub ordinal: usize,
}

impl DocPayload {
    /// Human-readable excerpt for citations: a `rows:{a}-{b}` range or
    /// "dataset summary".
    pub fn excerpt(&self) -> String {
        match (self.doc_type, self.row_start, self.row_end) {
            (DocType::Summary, _, _) => "dataset summary".to_string(),
            (DocType::Rows, Some(a), Some(b)) => format!("rows:{a}-{b}"),
            (DocType::Rows, _, _) => "rows".to_string(),
        }
    }
}

/// One retrievable document: stable id, rendered text, citation payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RagDocument {
    pub doc_id: uuid::Uuid,
    pub text: String,
    pub payload: DocPayload,
}

/// Builds the full document sequence for one dataset.
///
/// `columns` restricts which columns are rendered; it must be a validated,
/// non-empty selection (typically `meta.columns`).
///
/// # Errors
/// Returns [`RagError::Validation`] when the dataset has no rows to index or
/// the column selection is empty.
pub fn build_documents(
    meta: &DatasetMeta,
    rows: &[Row],
    columns: &[String],
    rows_per_doc: usize,
    max_rows: usize,
    char_budget: usize,
) -> Result<Vec<RagDocument>, RagError> {
    let take = rows.len().min(max_rows);
    if take == 0 {
        return Err(RagError::Validation(format!(
            "dataset {} has no rows to index",
            meta.dataset_id
        )));
    }
    if columns.is_empty() {
        return Err(RagError::Validation("columns must not be empty".into()));
    }

    let mut docs = Vec::with_capacity(1 + take / rows_per_doc.max(1));

    docs.push(RagDocument {
        doc_id: stable_uuid(&format!("{}:summary", meta.dataset_id)),
        text: render_summary(meta, columns),
        payload: DocPayload {
            dataset_id: meta.dataset_id.clone(),
            doc_type: DocType::Summary,
            row_start: None,
            row_end: None,
            ordinal: 0,
        },
    });

    let rows = &rows[..take];
    for (batch_no, batch) in rows.chunks(rows_per_doc).enumerate() {
        let start = batch_no * rows_per_doc;
        push_row_docs(meta, columns, batch, start, char_budget, &mut docs);
    }

    // Ordinals follow final build order, including budget splits.
    for (i, d) in docs.iter_mut().enumerate() {
        d.payload.ordinal = i;
    }

    debug!(
        dataset_id = %meta.dataset_id,
        docs = docs.len(),
        rows_indexed = take,
        "built document sequence"
    );
    Ok(docs)
}

/// Renders one row batch; splits in half recursively while the rendered text
/// exceeds the budget and the batch still has more than one row.
fn push_row_docs(
    meta: &DatasetMeta,
    columns: &[String],
    batch: &[Row],
    start: usize,
    char_budget: usize,
    out: &mut Vec<RagDocument>,
) {
    let text = render_rows(columns, batch, start);
    if text.len() > char_budget && batch.len() > 1 {
        let mid = batch.len() / 2;
        push_row_docs(meta, columns, &batch[..mid], start, char_budget, out);
        push_row_docs(meta, columns, &batch[mid..], start + mid, char_budget, out);
        return;
    }

    let end = start + batch.len() - 1;
    out.push(RagDocument {
        doc_id: stable_uuid(&format!("{}:rows:{start}-{end}", meta.dataset_id)),
        text,
        payload: DocPayload {
            dataset_id: meta.dataset_id.clone(),
            doc_type: DocType::Rows,
            row_start: Some(start),
            row_end: Some(end),
            ordinal: 0,
        },
    });
}

/// Summary text: filename, dimensions, schema line, numeric aggregates and
/// top categorical values. No timestamps, so the text stays reproducible.
fn render_summary(meta: &DatasetMeta, columns: &[String]) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "Dataset {} ({} rows, {} columns)\n",
        meta.filename, meta.nb_rows, meta.nb_columns
    ));
    s.push_str(&format!("Columns: {}\n", meta.schema_line_for(columns)));

    for (col, stats) in &meta.numeric_summary {
        if !columns.contains(col) {
            continue;
        }
        s.push_str(&format!(
            "{col}: min={} max={} mean={:.4}\n",
            stats.min, stats.max, stats.mean
        ));
    }
    for (col, values) in &meta.top_values {
        if !columns.contains(col) {
            continue;
        }
        let rendered: Vec<String> = values
            .iter()
            .map(|tv| format!("{} ({})", tv.value, tv.count))
            .collect();
        s.push_str(&format!("{col} top values: {}\n", rendered.join(", ")));
    }
    s
}

/// Row batch text: one line per row, `row_index=N | col=value | ...`,
/// columns in schema order.
fn render_rows(columns: &[String], batch: &[Row], start: usize) -> String {
    let mut lines = Vec::with_capacity(batch.len());
    for (offset, row) in batch.iter().enumerate() {
        let mut parts = vec![format!("row_index={}", start + offset)];
        for col in columns {
            let rendered = match row.get(col) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(v) => v.to_string(),
            };
            parts.push(format!("{col}={rendered}"));
        }
        lines.push(parts.join(" | "));
    }
    lines.join("\n")
}
