use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::BuildHasher;

use crate::HpoError;

const PREFIXES: [&str; 2] = ["NCBI-GeneID:", "Entrez:"];

/// A unique identifier for a gene
///
/// It represents the NCBI (Entrez) Gene ID. Ordering is numerical, which
/// is used as the last tie-breaker when ranking genes.
#[derive(Clone, Copy, Default, Debug, Hash, PartialEq, PartialOrd, Eq, Ord)]
pub struct GeneId {
    inner: u32,
}

impl GeneId {
    /// Returns the numerical gene id
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl TryFrom<&str> for GeneId {
    type Error = HpoError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(GeneId {
            inner: value.parse::<u32>()?,
        })
    }
}

impl From<u32> for GeneId {
    fn from(inner: u32) -> Self {
        GeneId { inner }
    }
}

impl Display for GeneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NCBI-GeneID:{}", self.inner)
    }
}

/// Translates the gene reference of a case row into a [`GeneId`]
///
/// Returning `None` means the reference is unknown. Callers skip
/// such rows with a warning instead of failing.
pub trait GeneResolver {
    /// Resolves `reference` into a [`GeneId`]
    fn resolve(&self, reference: &str) -> Option<GeneId>;
}

impl<T: GeneResolver + ?Sized> GeneResolver for &T {
    fn resolve(&self, reference: &str) -> Option<GeneId> {
        (**self).resolve(reference)
    }
}

/// Symbol table, e.g. HGNC gene symbols to NCBI gene ids
///
/// Surrounding whitespace of the reference is ignored, the lookup
/// itself is case sensitive.
impl<S: BuildHasher> GeneResolver for HashMap<String, GeneId, S> {
    fn resolve(&self, reference: &str) -> Option<GeneId> {
        self.get(reference.trim()).copied()
    }
}

/// Resolves numerical NCBI gene references
///
/// Accepted forms are `2125`, `Entrez:2125` and `NCBI-GeneID:2125`. The
/// prefix is matched case-insensitive.
///
/// # Examples
///
/// ```
/// use phenorank::annotations::{GeneId, GeneResolver, NcbiGeneIds};
///
/// let resolver = NcbiGeneIds::new();
/// assert_eq!(resolver.resolve("2125"), Some(GeneId::from(2125)));
/// assert_eq!(resolver.resolve("entrez:2125"), Some(GeneId::from(2125)));
/// assert_eq!(resolver.resolve("NCBI-GeneID:002125"), Some(GeneId::from(2125)));
/// assert_eq!(resolver.resolve("EVX2"), None);
///
/// let restricted = NcbiGeneIds::with_known_ids([GeneId::from(10)]);
/// assert_eq!(restricted.resolve("Entrez:10"), Some(GeneId::from(10)));
/// assert_eq!(restricted.resolve("Entrez:2125"), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct NcbiGeneIds {
    known: Option<HashSet<GeneId>>,
}

impl NcbiGeneIds {
    /// Accepts every well formed gene id
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts only well formed gene ids that are part of `known`
    pub fn with_known_ids<I: IntoIterator<Item = GeneId>>(known: I) -> Self {
        Self {
            known: Some(known.into_iter().collect()),
        }
    }

    fn parse(reference: &str) -> Option<GeneId> {
        let mut number = reference.trim();
        for prefix in PREFIXES {
            if let Some(head) = number.get(..prefix.len()) {
                if head.eq_ignore_ascii_case(prefix) {
                    number = &number[prefix.len()..];
                    break;
                }
            }
        }
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        GeneId::try_from(number).ok()
    }
}

impl GeneResolver for NcbiGeneIds {
    fn resolve(&self, reference: &str) -> Option<GeneId> {
        let gene = Self::parse(reference)?;
        match &self.known {
            Some(known) if !known.contains(&gene) => None,
            _ => Some(gene),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gene_id_display() {
        assert_eq!(GeneId::from(2125).to_string(), "NCBI-GeneID:2125");
        assert_eq!(GeneId::try_from("0010").unwrap(), GeneId::from(10));
        assert!(GeneId::try_from("NAT2").is_err());
    }

    #[test]
    fn gene_ids_are_ordered_numerically() {
        let mut ids: Vec<GeneId> = [100u32, 9, 20].into_iter().map(GeneId::from).collect();
        ids.sort();
        assert_eq!(ids, vec![GeneId::from(9), GeneId::from(20), GeneId::from(100)]);
    }

    #[test]
    fn ncbi_prefixes() {
        let resolver = NcbiGeneIds::new();
        assert_eq!(resolver.resolve(" Entrez:10 "), Some(10.into()));
        assert_eq!(resolver.resolve("ENTREZ:10"), Some(10.into()));
        assert_eq!(resolver.resolve("ncbi-geneid:10"), Some(10.into()));
        assert_eq!(resolver.resolve("Entrez:"), None);
        assert_eq!(resolver.resolve("Entrez:1a"), None);
        assert_eq!(resolver.resolve("+10"), None);
        assert_eq!(resolver.resolve(""), None);
        assert_eq!(resolver.resolve("99999999999"), None);
    }

    #[test]
    fn symbol_table() {
        let mut symbols: HashMap<String, GeneId> = HashMap::new();
        symbols.insert("NAT2".to_string(), 10.into());
        assert_eq!(symbols.resolve("NAT2"), Some(10.into()));
        assert_eq!(symbols.resolve("NAT2\t"), Some(10.into()));
        assert_eq!(symbols.resolve("nat2"), None);
    }

    #[test]
    fn resolver_by_reference() {
        fn resolve_with<R: GeneResolver>(resolver: R, reference: &str) -> Option<GeneId> {
            resolver.resolve(reference)
        }
        let resolver = NcbiGeneIds::new();
        assert_eq!(resolve_with(&resolver, "7"), Some(7.into()));
        assert_eq!(resolve_with(&&resolver, "7"), Some(7.into()));
    }
}
