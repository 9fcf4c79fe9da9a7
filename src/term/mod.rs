//! [`HpoTerm`]s are the main building block of the [`Ontology`](crate::Ontology)
//!
//! Each term is identified by an [`HpoTermId`] and linked to its declared
//! children. Parents and the ancestor closure are derived from those links.

mod group;
mod hpoterm;
mod hpotermid;
pub(crate) mod internal;

pub use group::{HpoGroup, HpoTermIds};
pub use hpoterm::{HpoTerm, Iter};
pub use hpotermid::HpoTermId;
