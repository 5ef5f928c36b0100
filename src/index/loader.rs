use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::catalog::TemplateEntry;
use crate::store::TemplateStore;

use super::error::{IndexError, IndexResult};
use super::matrix::EmbeddingMatrix;

/// Fetches vectors for every catalog entry and stacks them in catalog order.
///
/// Returns the ids in row order alongside the matrix. Fails with
/// [`IndexError::MissingEmbeddings`] naming every id without a vector, whether
/// the store reports them or silently omits them.
pub async fn load_matrix<S: TemplateStore>(
    store: &S,
    catalog: &[TemplateEntry],
) -> IndexResult<(Vec<u64>, EmbeddingMatrix)> {
    let ids: Vec<u64> = catalog.iter().map(|e| e.id()).collect();
    if ids.is_empty() {
        return Ok((ids, EmbeddingMatrix::empty()));
    }

    debug!(templates = ids.len(), "Fetching template embeddings");
    let vectors = store.fetch_template_embeddings(&ids).await?;

    let missing: BTreeSet<u64> = ids
        .iter()
        .copied()
        .filter(|id| !vectors.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(IndexError::MissingEmbeddings {
            ids: missing.into_iter().collect(),
        });
    }

    let matrix = EmbeddingMatrix::from_rows(
        ids.iter()
            .filter_map(|id| vectors.get(id).map(|v| (*id, v.as_slice()))),
    )?;

    if matrix.rows() != ids.len() {
        return Err(IndexError::RowCountMismatch {
            catalog: ids.len(),
            matrix: matrix.rows(),
        });
    }

    info!(rows = matrix.rows(), dim = matrix.dim(), "Embedding matrix loaded");

    Ok((ids, matrix))
}
