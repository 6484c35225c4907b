//! Input and output records for distribution planning.

use serde::{Deserialize, Serialize};

/// Sentinel bucket for billboards without a size category.
pub const UNKNOWN_SIZE: &str = "unknown";

/// Sentinel bucket for billboards without a municipality.
pub const UNKNOWN_MUNICIPALITY: &str = "unknown";

/// Map a raw grouping field to its bucket, folding blanks into `sentinel`.
pub(crate) fn group_label<'a>(raw: &'a str, sentinel: &'static str) -> &'a str {
    let trimmed = raw.trim();
    if trimmed.is_empty() { sentinel } else { trimmed }
}

/// A billboard record as read from the inventory store.
///
/// Construct through [`Billboard::new`] (or call [`Billboard::normalize`]
/// after deserializing) so blank size/municipality fields land in the
/// sentinel buckets once, instead of threading optionality through the
/// planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Billboard {
    pub id: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub municipality: String,
    /// Informational only; never consulted by the planner.
    #[serde(default)]
    pub city: String,
    /// Raw `"lat, lon"` string; may be absent or malformed.
    #[serde(default)]
    pub coordinates: Option<String>,
}

impl Billboard {
    /// Create a billboard, applying the defaulting rules once.
    pub fn new(
        id: impl Into<String>,
        size: &str,
        municipality: &str,
        city: &str,
        coordinates: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            size: size.to_string(),
            municipality: municipality.to_string(),
            city: city.to_string(),
            coordinates: coordinates.map(str::to_string),
        }
        .normalize()
    }

    /// Fold blank size/municipality fields into the sentinel buckets.
    pub fn normalize(mut self) -> Self {
        self.size = group_label(&self.size, UNKNOWN_SIZE).to_string();
        self.municipality = group_label(&self.municipality, UNKNOWN_MUNICIPALITY).to_string();
        self
    }
}

/// Grouping key for one site: `{size}_{municipality}_site{index}`.
///
/// The site index is the cluster's post-shuffle position within its
/// municipality; the key exists for later bulk operations ("remove
/// everything from this site"), not for lookup during planning.
pub fn site_key(size: &str, municipality: &str, site_index: usize) -> String {
    format!("{size}_{municipality}_site{site_index}")
}

/// One billboard's assignment within a distribution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionItem {
    pub billboard_id: String,
    /// 0-based index into the distribution's partner list.
    pub partner_index: usize,
    /// `{size}_{municipality}_site{n}` bulk-removal key.
    pub site_key: String,
    pub size_key: String,
    pub municipality_key: String,
    /// True when the assignment happened after every partner's quota for
    /// this size was exhausted; false for quota-driven assignments.
    pub overflow: bool,
}

/// Inventory filters a distribution was produced from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionFilters {
    pub size: Option<String>,
    pub municipality: Option<String>,
    pub city: Option<String>,
    pub status: Option<String>,
    pub ad_type: Option<String>,
}

/// A full planning run: the items plus everything needed to replay it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub id: String,
    pub filters: DistributionFilters,
    /// Same-site distance cutoff the run was clustered with, in meters.
    pub threshold_m: f64,
    /// Ordered partner names; item partner indices point into this list.
    pub partners: Vec<String>,
    /// Per-partner item counts, kept in sync with `items`.
    pub partner_counts: Vec<usize>,
    /// Seed the shuffles were driven by, stored for replay.
    pub seed: String,
    /// Marks the authoritative distribution for its size filter.
    pub active: bool,
    pub items: Vec<DistributionItem>,
}

/// Recompute per-partner item counts from an item list.
pub fn partner_counts(items: &[DistributionItem], partner_count: usize) -> Vec<usize> {
    let mut counts = vec![0; partner_count];
    for item in items {
        if let Some(slot) = counts.get_mut(item.partner_index) {
            *slot += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_sentinel_defaults() {
        let b = Billboard::new("b1", "", "  ", "Riyadh", None);
        assert_eq!(b.size, UNKNOWN_SIZE);
        assert_eq!(b.municipality, UNKNOWN_MUNICIPALITY);
    }

    #[test]
    fn new_keeps_populated_fields() {
        let b = Billboard::new("b1", "3x4", "Olaya", "Riyadh", Some("24.7, 46.6"));
        assert_eq!(b.size, "3x4");
        assert_eq!(b.municipality, "Olaya");
        assert_eq!(b.coordinates.as_deref(), Some("24.7, 46.6"));
    }

    #[test]
    fn site_key_format() {
        assert_eq!(site_key("3x4", "Olaya", 2), "3x4_Olaya_site2");
    }

    #[test]
    fn billboard_deserializes_with_missing_fields() {
        let b: Billboard = serde_json::from_str(r#"{"id": "b9"}"#).unwrap();
        assert_eq!(b.id, "b9");
        assert_eq!(b.size, "");
        assert!(b.coordinates.is_none());

        let b = b.normalize();
        assert_eq!(b.size, UNKNOWN_SIZE);
        assert_eq!(b.municipality, UNKNOWN_MUNICIPALITY);
    }

    #[test]
    fn partner_counts_tallies_items() {
        let items = vec![
            DistributionItem {
                billboard_id: "a".into(),
                partner_index: 0,
                site_key: "s".into(),
                size_key: "3x4".into(),
                municipality_key: "m".into(),
                overflow: false,
            },
            DistributionItem {
                billboard_id: "b".into(),
                partner_index: 1,
                site_key: "s".into(),
                size_key: "3x4".into(),
                municipality_key: "m".into(),
                overflow: false,
            },
            DistributionItem {
                billboard_id: "c".into(),
                partner_index: 1,
                site_key: "s".into(),
                size_key: "3x4".into(),
                municipality_key: "m".into(),
                overflow: false,
            },
        ];
        assert_eq!(partner_counts(&items, 3), vec![1, 2, 0]);
    }
}
