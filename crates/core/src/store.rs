//! Collaborator seams for billboard lookup and distribution persistence.
//!
//! The engine performs no I/O of its own; callers hand it these traits and
//! run the pure planning step wherever they like. [`MemoryStore`] is the
//! reference implementation used by the test suite and the CLI tools.

use rustc_hash::FxHashMap;

use crate::error::{DistError, Result};
use crate::model::{Billboard, Distribution, DistributionItem, partner_counts};

/// Which item group a bulk operation targets.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupSelector {
    Size(String),
    Municipality(String),
}

impl GroupSelector {
    pub fn matches(&self, item: &DistributionItem) -> bool {
        match self {
            GroupSelector::Size(key) => item.size_key == *key,
            GroupSelector::Municipality(key) => item.municipality_key == *key,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            GroupSelector::Size(key) | GroupSelector::Municipality(key) => key,
        }
    }
}

/// Read side: fetch full billboard records by id.
pub trait BillboardSource {
    /// Records for `ids`, in input order; ids that no longer exist are
    /// skipped.
    fn billboards_by_ids(&self, ids: &[String]) -> Result<Vec<Billboard>>;
}

/// Write side: distribution persistence.
///
/// Implementations must write a distribution together with its items as
/// one logical transaction, and [`activate`](DistributionStore::activate)
/// must leave at most one active distribution per size filter.
pub trait DistributionStore {
    /// Create a distribution record with all of its items.
    fn insert(&mut self, distribution: Distribution) -> Result<()>;

    fn get(&self, id: &str) -> Result<Distribution>;

    /// Replace items, partner list, and seed, preserving identity and
    /// filters; per-partner counts are recomputed from the new items.
    fn replace_items(
        &mut self,
        id: &str,
        partners: Vec<String>,
        seed: String,
        items: Vec<DistributionItem>,
    ) -> Result<()>;

    /// Delete every item matching `selector`, then persist recomputed
    /// per-partner counts. Returns how many items were removed.
    fn remove_items(&mut self, id: &str, selector: &GroupSelector) -> Result<usize>;

    /// Exchange the partner assignments of two items atomically.
    fn swap_partner_indices(
        &mut self,
        id: &str,
        billboard_a: &str,
        billboard_b: &str,
    ) -> Result<()>;

    /// Mark `id` active and deactivate any other distribution sharing its
    /// size filter, as one logical step.
    fn activate(&mut self, id: &str) -> Result<()>;
}

/// In-memory billboard inventory backing the tests and CLI tools.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    billboards: FxHashMap<String, Billboard>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_billboards(&mut self, billboards: impl IntoIterator<Item = Billboard>) {
        for billboard in billboards {
            self.billboards.insert(billboard.id.clone(), billboard);
        }
    }
}

impl BillboardSource for MemoryInventory {
    fn billboards_by_ids(&self, ids: &[String]) -> Result<Vec<Billboard>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.billboards.get(id).cloned())
            .collect())
    }
}

/// In-memory distribution store backing the tests and CLI tools.
#[derive(Debug, Default)]
pub struct MemoryStore {
    distributions: FxHashMap<String, Distribution>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distributions(&self) -> impl Iterator<Item = &Distribution> {
        self.distributions.values()
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Distribution> {
        self.distributions
            .get_mut(id)
            .ok_or_else(|| DistError::DistributionNotFound(id.to_string()))
    }
}

impl DistributionStore for MemoryStore {
    fn insert(&mut self, distribution: Distribution) -> Result<()> {
        if self.distributions.contains_key(&distribution.id) {
            return Err(DistError::Store(format!(
                "duplicate distribution id: {}",
                distribution.id
            )));
        }
        self.distributions
            .insert(distribution.id.clone(), distribution);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Distribution> {
        self.distributions
            .get(id)
            .cloned()
            .ok_or_else(|| DistError::DistributionNotFound(id.to_string()))
    }

    fn replace_items(
        &mut self,
        id: &str,
        partners: Vec<String>,
        seed: String,
        items: Vec<DistributionItem>,
    ) -> Result<()> {
        let distribution = self.get_mut(id)?;
        distribution.partner_counts = partner_counts(&items, partners.len());
        distribution.partners = partners;
        distribution.seed = seed;
        distribution.items = items;
        Ok(())
    }

    fn remove_items(&mut self, id: &str, selector: &GroupSelector) -> Result<usize> {
        let distribution = self.get_mut(id)?;
        let before = distribution.items.len();
        distribution.items.retain(|item| !selector.matches(item));
        let removed = before - distribution.items.len();
        distribution.partner_counts =
            partner_counts(&distribution.items, distribution.partners.len());
        Ok(removed)
    }

    fn swap_partner_indices(
        &mut self,
        id: &str,
        billboard_a: &str,
        billboard_b: &str,
    ) -> Result<()> {
        let distribution = self.get_mut(id)?;
        let pos_a = distribution
            .items
            .iter()
            .position(|item| item.billboard_id == billboard_a)
            .ok_or_else(|| DistError::BillboardNotFound(billboard_a.to_string()))?;
        let pos_b = distribution
            .items
            .iter()
            .position(|item| item.billboard_id == billboard_b)
            .ok_or_else(|| DistError::BillboardNotFound(billboard_b.to_string()))?;

        let partner_a = distribution.items[pos_a].partner_index;
        distribution.items[pos_a].partner_index = distribution.items[pos_b].partner_index;
        distribution.items[pos_b].partner_index = partner_a;
        Ok(())
    }

    fn activate(&mut self, id: &str) -> Result<()> {
        let size_filter = self
            .distributions
            .get(id)
            .ok_or_else(|| DistError::DistributionNotFound(id.to_string()))?
            .filters
            .size
            .clone();

        for (other_id, distribution) in &mut self.distributions {
            if other_id == id {
                distribution.active = true;
            } else if distribution.filters.size == size_filter {
                distribution.active = false;
            }
        }
        Ok(())
    }
}
