//! Genes are the targets of the prioritization
//!
//! Training and evaluation data reference the causal gene of a patient
//! by a free text reference, e.g. `Entrez:2125` or a gene symbol. A
//! [`GeneResolver`] translates those references into [`GeneId`]s.
//!
//! Two resolvers are provided:
//! - [`NcbiGeneIds`] understands numerical NCBI (Entrez) gene ids
//! - `HashMap<String, GeneId>` is a lookup table, e.g. from HGNC symbols

mod gene;
pub use gene::{GeneId, GeneResolver, NcbiGeneIds};
