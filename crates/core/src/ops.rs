//! Distribution lifecycle operations over the store seams.
//!
//! Pure planning stays in [`crate::planner`]; these functions wire it to a
//! [`DistributionStore`]. The write-then-activate ordering means a
//! persistence failure never strands the previously-active distribution.

use tracing::info;

use crate::error::{DistError, Result};
use crate::model::{Billboard, Distribution, DistributionFilters, DistributionItem, partner_counts};
use crate::planner::{PlanParams, plan};
use crate::store::{BillboardSource, DistributionStore, GroupSelector};

/// Inputs for [`generate_and_save`].
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub id: String,
    pub filters: DistributionFilters,
    pub threshold_m: f64,
    /// Ordered partner names; the order fixes every partner index.
    pub partners: Vec<String>,
    /// Seed to plan with; callers keep it unique per run so the
    /// distribution can be replayed later.
    pub seed: String,
}

/// Plan a distribution for `billboards` and persist it as the active
/// distribution for its size filter.
///
/// The record and its items are written before the activation step, so a
/// failure on either side leaves any previously-active distribution in
/// place.
pub fn generate_and_save<S: DistributionStore>(
    store: &mut S,
    billboards: &[Billboard],
    request: GenerateRequest,
) -> Result<Distribution> {
    let params = PlanParams::new(
        request.threshold_m,
        request.seed.clone(),
        request.partners.len(),
    );
    let items = plan(billboards, &params)?;

    let distribution = Distribution {
        id: request.id,
        filters: request.filters,
        threshold_m: request.threshold_m,
        partner_counts: partner_counts(&items, request.partners.len()),
        partners: request.partners,
        seed: request.seed,
        active: false,
        items,
    };

    store.insert(distribution.clone())?;
    store.activate(&distribution.id)?;

    info!(
        "Distribution saved - id={}, items={}, partners={}",
        distribution.id,
        distribution.items.len(),
        distribution.partners.len()
    );

    store.get(&distribution.id)
}

/// Re-plan an existing distribution in place with a fresh seed.
///
/// Billboard records are re-fetched through `source` so the new plan
/// reflects current inventory. Identity and filters are preserved; the
/// partner list (and with it the partner count) changes only when
/// `new_partners` is given.
pub fn redistribute<S, B>(
    store: &mut S,
    source: &B,
    distribution_id: &str,
    new_seed: impl Into<String>,
    new_partners: Option<Vec<String>>,
) -> Result<Distribution>
where
    S: DistributionStore,
    B: BillboardSource,
{
    let existing = store.get(distribution_id)?;
    let ids: Vec<String> = existing
        .items
        .iter()
        .map(|item| item.billboard_id.clone())
        .collect();
    let billboards = source.billboards_by_ids(&ids)?;

    let partners = new_partners.unwrap_or_else(|| existing.partners.clone());
    let seed = new_seed.into();
    let params = PlanParams::new(existing.threshold_m, seed.clone(), partners.len());
    let items = plan(&billboards, &params)?;

    store.replace_items(distribution_id, partners, seed, items)?;

    info!("Distribution regenerated - id={}", distribution_id);

    store.get(distribution_id)
}

/// Exchange the partner assignments of two billboards in one distribution.
///
/// Fails without touching the distribution when either billboard is
/// missing from it or both already sit on the same partner.
pub fn swap_billboards<S: DistributionStore>(
    store: &mut S,
    distribution_id: &str,
    billboard_a: &str,
    billboard_b: &str,
) -> Result<()> {
    let distribution = store.get(distribution_id)?;
    let item_a = find_item(&distribution, billboard_a)?;
    let item_b = find_item(&distribution, billboard_b)?;
    if item_a.partner_index == item_b.partner_index {
        return Err(DistError::SamePartnerSwap(
            billboard_a.to_string(),
            billboard_b.to_string(),
        ));
    }

    store.swap_partner_indices(distribution_id, billboard_a, billboard_b)
}

/// Delete every item in the given size group and refresh partner counts.
pub fn remove_by_size<S: DistributionStore>(
    store: &mut S,
    distribution_id: &str,
    size_key: &str,
) -> Result<usize> {
    remove_group(store, distribution_id, GroupSelector::Size(size_key.into()))
}

/// Delete every item in the given municipality group and refresh partner
/// counts.
pub fn remove_by_municipality<S: DistributionStore>(
    store: &mut S,
    distribution_id: &str,
    municipality_key: &str,
) -> Result<usize> {
    remove_group(
        store,
        distribution_id,
        GroupSelector::Municipality(municipality_key.into()),
    )
}

fn remove_group<S: DistributionStore>(
    store: &mut S,
    distribution_id: &str,
    selector: GroupSelector,
) -> Result<usize> {
    let removed = store.remove_items(distribution_id, &selector)?;
    if removed == 0 {
        return Err(DistError::NoMatchingItems(selector.key().to_string()));
    }

    info!(
        "Items removed - id={}, key={}, removed={}",
        distribution_id,
        selector.key(),
        removed
    );

    Ok(removed)
}

fn find_item<'a>(
    distribution: &'a Distribution,
    billboard_id: &str,
) -> Result<&'a DistributionItem> {
    distribution
        .items
        .iter()
        .find(|item| item.billboard_id == billboard_id)
        .ok_or_else(|| DistError::BillboardNotFound(billboard_id.to_string()))
}
