//! Integration tests for distribution lifecycle operations.

use valla_core::{
    Billboard, DistError, Distribution, DistributionFilters, DistributionItem, DistributionStore,
    EARTH_RADIUS_M, GenerateRequest, GroupSelector, MemoryInventory, MemoryStore,
    generate_and_save, redistribute, remove_by_municipality, remove_by_size, swap_billboards,
};

fn coord(meters_north: f64) -> String {
    let meters_per_degree = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
    format!("{}, 0.0", meters_north / meters_per_degree)
}

fn sample_billboards() -> Vec<Billboard> {
    vec![
        Billboard::new("b1", "3x4", "M1", "", Some(&coord(0.0))),
        Billboard::new("b2", "3x4", "M1", "", Some(&coord(1_500.0))),
        Billboard::new("b3", "3x4", "M2", "", Some(&coord(3_000.0))),
        Billboard::new("b4", "3x4", "M2", "", Some(&coord(4_500.0))),
        Billboard::new("b5", "4x12", "M1", "", Some(&coord(6_000.0))),
        Billboard::new("b6", "4x12", "M1", "", Some(&coord(7_500.0))),
    ]
}

fn request(id: &str, seed: &str) -> GenerateRequest {
    GenerateRequest {
        id: id.to_string(),
        filters: DistributionFilters {
            size: Some("3x4".to_string()),
            ..Default::default()
        },
        threshold_m: 500.0,
        partners: vec!["North Media".to_string(), "South Media".to_string()],
        seed: seed.to_string(),
    }
}

fn saved_distribution(store: &mut MemoryStore) -> Distribution {
    generate_and_save(store, &sample_billboards(), request("d1", "seed-1")).unwrap()
}

fn items_for_partners(distribution: &Distribution) -> (String, String) {
    let on_first = distribution
        .items
        .iter()
        .find(|item| item.partner_index == 0)
        .unwrap();
    let on_second = distribution
        .items
        .iter()
        .find(|item| item.partner_index == 1)
        .unwrap();
    (
        on_first.billboard_id.clone(),
        on_second.billboard_id.clone(),
    )
}

// ============================================================================
// generate_and_save
// ============================================================================

#[test]
fn generate_and_save_persists_an_active_distribution() {
    let mut store = MemoryStore::new();

    let distribution = saved_distribution(&mut store);

    assert!(distribution.active);
    assert_eq!(distribution.items.len(), 6);
    assert_eq!(distribution.partner_counts.iter().sum::<usize>(), 6);
    assert_eq!(store.get("d1").unwrap(), distribution);
}

#[test]
fn activation_supersedes_same_size_filter_only() {
    let mut store = MemoryStore::new();
    saved_distribution(&mut store);

    generate_and_save(&mut store, &sample_billboards(), request("d2", "seed-2")).unwrap();

    let mut other_filter = request("d3", "seed-3");
    other_filter.filters.size = Some("4x12".to_string());
    generate_and_save(&mut store, &sample_billboards(), other_filter).unwrap();

    assert!(!store.get("d1").unwrap().active);
    assert!(store.get("d2").unwrap().active);
    assert!(store.get("d3").unwrap().active);
}

#[test]
fn failed_insert_leaves_previous_distribution_active() {
    let mut store = MemoryStore::new();
    saved_distribution(&mut store);

    let mut failing = FailingStore { inner: store };
    let result = generate_and_save(&mut failing, &sample_billboards(), request("d2", "seed-2"));

    assert!(result.is_err());
    assert!(failing.inner.get("d1").unwrap().active);
    assert!(failing.inner.get("d2").is_err());
}

// ============================================================================
// redistribute
// ============================================================================

#[test]
fn redistribute_replaces_items_and_preserves_identity() {
    let mut store = MemoryStore::new();
    let original = saved_distribution(&mut store);

    let mut inventory = MemoryInventory::new();
    inventory.insert_billboards(sample_billboards());

    let regenerated = redistribute(&mut store, &inventory, "d1", "seed-2", None).unwrap();

    assert_eq!(regenerated.id, original.id);
    assert_eq!(regenerated.filters, original.filters);
    assert_eq!(regenerated.threshold_m, original.threshold_m);
    assert_eq!(regenerated.partners, original.partners);
    assert_eq!(regenerated.seed, "seed-2");
    assert_eq!(regenerated.items.len(), original.items.len());
    assert_eq!(regenerated.partner_counts.iter().sum::<usize>(), 6);
}

#[test]
fn redistribute_accepts_a_new_partner_list() {
    let mut store = MemoryStore::new();
    saved_distribution(&mut store);

    let mut inventory = MemoryInventory::new();
    inventory.insert_billboards(sample_billboards());

    let partners = vec![
        "North Media".to_string(),
        "South Media".to_string(),
        "East Media".to_string(),
    ];
    let regenerated =
        redistribute(&mut store, &inventory, "d1", "seed-3", Some(partners)).unwrap();

    assert_eq!(regenerated.partners.len(), 3);
    assert_eq!(regenerated.partner_counts.len(), 3);
    assert!(regenerated.items.iter().all(|item| item.partner_index < 3));
    assert_eq!(regenerated.partner_counts.iter().sum::<usize>(), 6);
}

// ============================================================================
// swap
// ============================================================================

#[test]
fn swap_exchanges_partner_assignments() {
    let mut store = MemoryStore::new();
    let distribution = saved_distribution(&mut store);
    let (id_a, id_b) = items_for_partners(&distribution);

    swap_billboards(&mut store, "d1", &id_a, &id_b).unwrap();

    let after = store.get("d1").unwrap();
    let item_a = after.items.iter().find(|i| i.billboard_id == id_a).unwrap();
    let item_b = after.items.iter().find(|i| i.billboard_id == id_b).unwrap();
    assert_eq!(item_a.partner_index, 1);
    assert_eq!(item_b.partner_index, 0);
}

#[test]
fn swapping_back_restores_the_original_assignment() {
    let mut store = MemoryStore::new();
    let original = saved_distribution(&mut store);
    let (id_a, id_b) = items_for_partners(&original);

    swap_billboards(&mut store, "d1", &id_a, &id_b).unwrap();
    swap_billboards(&mut store, "d1", &id_b, &id_a).unwrap();

    assert_eq!(store.get("d1").unwrap().items, original.items);
}

#[test]
fn swap_on_same_partner_is_a_noop_failure() {
    let mut store = MemoryStore::new();
    let distribution = saved_distribution(&mut store);

    let same: Vec<&DistributionItem> = distribution
        .items
        .iter()
        .filter(|item| item.partner_index == 0)
        .collect();
    assert!(same.len() >= 2);

    let result = swap_billboards(&mut store, "d1", &same[0].billboard_id, &same[1].billboard_id);

    assert!(matches!(result, Err(DistError::SamePartnerSwap(_, _))));
    assert_eq!(store.get("d1").unwrap(), distribution);
}

#[test]
fn swap_with_unknown_billboard_is_a_noop_failure() {
    let mut store = MemoryStore::new();
    let distribution = saved_distribution(&mut store);
    let (id_a, _) = items_for_partners(&distribution);

    let result = swap_billboards(&mut store, "d1", &id_a, "ghost");

    assert!(matches!(result, Err(DistError::BillboardNotFound(_))));
    assert_eq!(store.get("d1").unwrap(), distribution);
}

// ============================================================================
// remove by group
// ============================================================================

#[test]
fn remove_by_size_drops_the_group_and_recomputes_counts() {
    let mut store = MemoryStore::new();
    saved_distribution(&mut store);

    let removed = remove_by_size(&mut store, "d1", "3x4").unwrap();

    assert_eq!(removed, 4);
    let after = store.get("d1").unwrap();
    assert!(after.items.iter().all(|item| item.size_key == "4x12"));
    assert_eq!(after.partner_counts.iter().sum::<usize>(), 2);
}

#[test]
fn remove_by_municipality_drops_the_group() {
    let mut store = MemoryStore::new();
    saved_distribution(&mut store);

    let removed = remove_by_municipality(&mut store, "d1", "M2").unwrap();

    assert_eq!(removed, 2);
    let after = store.get("d1").unwrap();
    assert!(
        after
            .items
            .iter()
            .all(|item| item.municipality_key != "M2")
    );
    assert_eq!(after.partner_counts.iter().sum::<usize>(), 4);
}

#[test]
fn remove_with_no_matches_is_a_noop_failure() {
    let mut store = MemoryStore::new();
    let distribution = saved_distribution(&mut store);

    let result = remove_by_size(&mut store, "d1", "9x9");

    assert!(matches!(result, Err(DistError::NoMatchingItems(_))));
    assert_eq!(store.get("d1").unwrap(), distribution);
}

// ============================================================================
// Failing-store helper
// ============================================================================

/// Store whose insert always fails, for exercising the write-then-activate
/// ordering.
struct FailingStore {
    inner: MemoryStore,
}

impl DistributionStore for FailingStore {
    fn insert(&mut self, _distribution: Distribution) -> valla_core::Result<()> {
        Err(DistError::Store("injected insert failure".to_string()))
    }

    fn get(&self, id: &str) -> valla_core::Result<Distribution> {
        self.inner.get(id)
    }

    fn replace_items(
        &mut self,
        id: &str,
        partners: Vec<String>,
        seed: String,
        items: Vec<DistributionItem>,
    ) -> valla_core::Result<()> {
        self.inner.replace_items(id, partners, seed, items)
    }

    fn remove_items(&mut self, id: &str, selector: &GroupSelector) -> valla_core::Result<usize> {
        self.inner.remove_items(id, selector)
    }

    fn swap_partner_indices(
        &mut self,
        id: &str,
        billboard_a: &str,
        billboard_b: &str,
    ) -> valla_core::Result<()> {
        self.inner.swap_partner_indices(id, billboard_a, billboard_b)
    }

    fn activate(&mut self, id: &str) -> valla_core::Result<()> {
        self.inner.activate(id)
    }
}
