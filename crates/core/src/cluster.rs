//! Proximity clustering of billboards into sites.
//!
//! Union-find over pairwise great-circle distance, with a nearest-neighbor
//! fallback merge so no positioned billboard is left floating alone when
//! another positioned billboard exists in the group.

use tracing::debug;

use crate::geo::{GeoPoint, haversine_distance, parse_coordinate};
use crate::model::Billboard;

/// Disjoint-set over arena indices.
///
/// `find` flattens paths iteratively; `union` reassigns one root directly
/// under the other. No rank bookkeeping: candidate sets are small (one
/// municipality within one size at a time).
#[derive(Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    /// Root of `x`, compressing the walked path.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merge the sets containing `a` and `b`; `b`'s root wins.
    pub fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parent[root_a] = root_b;
        }
    }
}

/// Partition billboards into spatial clusters ("sites").
///
/// Two billboards land in the same cluster when their great-circle
/// distance is within `threshold_m`, transitively. A positioned billboard
/// left alone after the threshold pass is force-merged with its nearest
/// positioned neighbor regardless of the threshold; billboards without a
/// parsable coordinate stay singletons unless something merged them. The
/// returned groups partition the input exactly: every billboard appears in
/// exactly one cluster.
///
/// Cluster order is deterministic (first-seen root in input order); any
/// presentation ordering is the caller's concern.
pub fn cluster_billboards(billboards: &[Billboard], threshold_m: f64) -> Vec<Vec<Billboard>> {
    if billboards.is_empty() {
        return Vec::new();
    }

    let points: Vec<Option<GeoPoint>> = billboards
        .iter()
        .map(|b| b.coordinates.as_deref().and_then(parse_coordinate))
        .collect();

    let n = billboards.len();
    let mut uf = UnionFind::new(n);

    for i in 0..n {
        let Some(pi) = points[i] else { continue };
        for j in (i + 1)..n {
            let Some(pj) = points[j] else { continue };
            if haversine_distance(pi, pj) <= threshold_m {
                uf.union(i, j);
            }
        }
    }

    let mut sizes = vec![0usize; n];
    for i in 0..n {
        let root = uf.find(i);
        sizes[root] += 1;
    }

    // Fallback pass: positioned billboards still alone are folded into
    // their nearest positioned neighbor, ignoring the threshold. Sizes are
    // refreshed as merges happen so later indices see the updated picture.
    for i in 0..n {
        let Some(pi) = points[i] else { continue };
        if sizes[uf.find(i)] != 1 {
            continue;
        }
        let mut nearest: Option<(usize, f64)> = None;
        for (j, pj) in points.iter().enumerate() {
            if j == i {
                continue;
            }
            let Some(pj) = pj else { continue };
            let d = haversine_distance(pi, *pj);
            match nearest {
                Some((_, best)) if d >= best => {}
                _ => nearest = Some((j, d)),
            }
        }
        if let Some((j, _)) = nearest {
            let merged = sizes[uf.find(i)] + sizes[uf.find(j)];
            uf.union(i, j);
            sizes[uf.find(i)] = merged;
        }
    }

    let mut clusters: Vec<Vec<Billboard>> = Vec::new();
    let mut slot_of_root: Vec<Option<usize>> = vec![None; n];
    for i in 0..n {
        let root = uf.find(i);
        let slot = match slot_of_root[root] {
            Some(slot) => slot,
            None => {
                clusters.push(Vec::new());
                slot_of_root[root] = Some(clusters.len() - 1);
                clusters.len() - 1
            }
        };
        clusters[slot].push(billboards[i].clone());
    }

    debug!(
        "Proximity clustering done - billboards={}, clusters={}, threshold_m={}",
        n,
        clusters.len(),
        threshold_m
    );

    clusters
}
