use tracing::debug;

use crate::catalog::{TemplateEntry, load_catalog};
use crate::hashing::{Fingerprinter, short_hex};
use crate::index::{EmbeddingMatrix, IndexError, load_matrix};
use crate::store::TemplateStore;

use super::error::EngineResult;

/// Catalog and embedding matrix published together.
///
/// Row `i` of the matrix is the vector of `catalog[i]`. Construction enforces
/// equal lengths, so any snapshot a reader holds is aligned.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    catalog: Vec<TemplateEntry>,
    matrix: EmbeddingMatrix,
    generation: u64,
    fingerprint: [u8; 32],
}

impl IndexSnapshot {
    pub fn new(
        catalog: Vec<TemplateEntry>,
        matrix: EmbeddingMatrix,
        generation: u64,
    ) -> Result<Self, IndexError> {
        if catalog.len() != matrix.rows() {
            return Err(IndexError::RowCountMismatch {
                catalog: catalog.len(),
                matrix: matrix.rows(),
            });
        }
        let fingerprint = fingerprint(&catalog, &matrix);
        Ok(Self {
            catalog,
            matrix,
            generation,
            fingerprint,
        })
    }

    #[inline]
    pub fn catalog(&self) -> &[TemplateEntry] {
        &self.catalog
    }

    #[inline]
    pub fn matrix(&self) -> &EmbeddingMatrix {
        &self.matrix
    }

    /// Sequence number of the refresh that published this snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// BLAKE3 digest over ids, texts, segments and vectors.
    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }
}

fn fingerprint(catalog: &[TemplateEntry], matrix: &EmbeddingMatrix) -> [u8; 32] {
    let mut fp = Fingerprinter::new();
    fp.update_u64(catalog.len() as u64)
        .update_u64(matrix.dim() as u64);
    for (entry, row) in catalog.iter().zip(matrix.iter_rows()) {
        fp.update_u64(entry.id())
            .update_str(entry.question())
            .update_str(entry.category())
            .update_str(entry.subcategory())
            .update_str(entry.answer())
            .update_f32s(row);
    }
    fp.finalize()
}

/// Loads a fresh catalog and matrix from `store` without publishing anything.
pub(crate) async fn build_snapshot<S: TemplateStore>(
    store: &S,
    generation: u64,
) -> EngineResult<IndexSnapshot> {
    let catalog = load_catalog(store).await?;
    let (ids, matrix) = load_matrix(store, &catalog).await?;
    debug_assert!(ids.iter().zip(&catalog).all(|(id, e)| *id == e.id()));

    let snapshot = IndexSnapshot::new(catalog, matrix, generation)?;
    debug!(
        generation,
        templates = snapshot.len(),
        fingerprint = %short_hex(snapshot.fingerprint()),
        "Snapshot built"
    );
    Ok(snapshot)
}
