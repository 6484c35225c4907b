//! Distribution planning: grouping, quota computation, greedy assignment.
//!
//! The planner is a pure function of its inputs. It groups billboards by
//! size, splits each size across partners with near-equal quotas, keeps
//! geographically co-located billboards together as sites via proximity
//! clustering, and assigns site-by-site with a greedy heuristic. The
//! heuristic is intentionally not an optimal partitioner; callers rely on
//! its exact tie-break behavior for reproducibility, so do not "improve"
//! the selection rule without revisiting the fairness tests.

use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::{debug, info};

use crate::cluster::cluster_billboards;
use crate::error::{DistError, Result};
use crate::model::{
    Billboard, DistributionItem, UNKNOWN_MUNICIPALITY, UNKNOWN_SIZE, group_label, site_key,
};
use crate::rng::SeededRng;

/// Parameters for one planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanParams {
    /// Same-site distance cutoff in meters.
    pub threshold_m: f64,

    /// Opaque seed driving the presentation shuffles. Identical seeds
    /// reproduce identical output; callers keep the seed for replay.
    pub seed: String,

    /// Number of partners receiving billboards. Must be at least 2.
    pub partner_count: usize,
}

impl PlanParams {
    pub fn new(threshold_m: f64, seed: impl Into<String>, partner_count: usize) -> Self {
        Self {
            threshold_m,
            seed: seed.into(),
            partner_count,
        }
    }
}

/// A cluster pooled for assignment, tagged with its municipality and its
/// post-shuffle position within that municipality.
struct SiteCluster {
    municipality: String,
    site_index: usize,
    billboards: Vec<Billboard>,
}

/// Assign every billboard to exactly one partner.
///
/// Fully deterministic for identical inputs including the seed. Size
/// groups and municipality groups are processed in lexicographic order, so
/// remainder placement does not depend on any incidental map iteration
/// order. Billboards with blank size or municipality are bucketed under
/// the `unknown` sentinels, never dropped.
pub fn plan(billboards: &[Billboard], params: &PlanParams) -> Result<Vec<DistributionItem>> {
    if billboards.is_empty() {
        return Err(DistError::EmptyInput);
    }
    if params.partner_count < 2 {
        return Err(DistError::TooFewPartners(params.partner_count));
    }

    let partner_count = params.partner_count;
    let mut rng = SeededRng::from_seed(&params.seed);
    let mut global_counts = vec![0usize; partner_count];
    let mut items = Vec::with_capacity(billboards.len());

    let mut by_size: BTreeMap<&str, Vec<&Billboard>> = BTreeMap::new();
    for billboard in billboards {
        by_size
            .entry(group_label(&billboard.size, UNKNOWN_SIZE))
            .or_default()
            .push(billboard);
    }

    for (size, group) in &by_size {
        let mut quotas = size_quotas(group.len(), &global_counts);
        debug!(
            "Planning size group - size={}, total={}, quotas={:?}",
            size,
            group.len(),
            quotas
        );

        for cluster in site_clusters(group, params.threshold_m, &mut rng) {
            for billboard in &cluster.billboards {
                let partner = pick_partner(&quotas, &global_counts);
                let overflow = quotas[partner] <= 0;
                quotas[partner] -= 1;
                global_counts[partner] += 1;

                items.push(DistributionItem {
                    billboard_id: billboard.id.clone(),
                    partner_index: partner,
                    site_key: site_key(size, &cluster.municipality, cluster.site_index),
                    size_key: (*size).to_string(),
                    municipality_key: cluster.municipality.clone(),
                    overflow,
                });
            }
        }
    }

    info!(
        "Plan complete - billboards={}, partners={}, per_partner={:?}",
        items.len(),
        partner_count,
        global_counts
    );

    Ok(items)
}

/// Per-partner quotas for one size group of `total` billboards.
///
/// Everyone gets `floor(total / partners)`; the remainder goes one-each to
/// the partners furthest behind on global running counts, ties broken by
/// ascending partner index. This is the cross-size fairness rule: the same
/// partner is not favored every time a remainder occurs.
fn size_quotas(total: usize, global_counts: &[usize]) -> Vec<i64> {
    let partners = global_counts.len();
    let base = (total / partners) as i64;
    let remainder = total % partners;

    let mut quotas = vec![base; partners];
    let behind_first = (0..partners).sorted_by_key(|&p| (global_counts[p], p));
    for p in behind_first.take(remainder) {
        quotas[p] += 1;
    }
    quotas
}

/// Cluster one size group municipality-by-municipality and pool the
/// resulting sites, largest first.
///
/// Cluster order and within-cluster order are shuffled with the seeded
/// generator before pooling; the shuffle affects presentation order and
/// equal-quota tie-breaking only, never the net per-partner totals. The
/// final sort is stable and by descending size: assigning large sites
/// while quotas are least depleted avoids splitting them unevenly near the
/// end of the budget.
fn site_clusters(group: &[&Billboard], threshold_m: f64, rng: &mut SeededRng) -> Vec<SiteCluster> {
    let mut by_municipality: BTreeMap<&str, Vec<Billboard>> = BTreeMap::new();
    for billboard in group {
        by_municipality
            .entry(group_label(&billboard.municipality, UNKNOWN_MUNICIPALITY))
            .or_default()
            .push((*billboard).clone());
    }

    let mut pooled = Vec::new();
    for (municipality, boards) in by_municipality {
        let mut clusters = cluster_billboards(&boards, threshold_m);
        rng.shuffle(&mut clusters);
        for (site_index, mut cluster) in clusters.into_iter().enumerate() {
            rng.shuffle(&mut cluster);
            pooled.push(SiteCluster {
                municipality: municipality.to_string(),
                site_index,
                billboards: cluster,
            });
        }
    }

    pooled.sort_by(|a, b| b.billboards.len().cmp(&a.billboards.len()));
    pooled
}

/// The partner receiving the next billboard: largest remaining quota, ties
/// to the smaller global running total, then the smaller index.
///
/// When every quota is at or below zero the same rule still picks a
/// partner; the caller flags that assignment as overflow.
fn pick_partner(quotas: &[i64], global_counts: &[usize]) -> usize {
    let mut best = 0;
    for p in 1..quotas.len() {
        if quotas[p] > quotas[best]
            || (quotas[p] == quotas[best] && global_counts[p] < global_counts[best])
        {
            best = p;
        }
    }
    best
}
