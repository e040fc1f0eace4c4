//! Screen-space grouping for the map overlay.
//!
//! Both functions work on projected positions in screen points, so the result
//! changes with zoom: zooming in spreads points apart and splits clusters.

use std::collections::BTreeMap;

/// Markers sharing one cluster bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenCluster {
    /// Position of the first member; later members join within the radius.
    pub anchor: [f32; 2],
    /// Mean position of all members, where the bubble is drawn.
    pub center: [f32; 2],
    /// Indices into the input slice.
    pub members: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterSize {
    Single,
    Small,
    Medium,
    Large,
}

impl ScreenCluster {
    pub fn size(&self) -> ClusterSize {
        match self.members.len() {
            0 | 1 => ClusterSize::Single,
            2..=9 => ClusterSize::Small,
            10..=99 => ClusterSize::Medium,
            _ => ClusterSize::Large,
        }
    }
}

fn distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Greedy grouping: each point joins the first cluster whose anchor lies
/// within `radius`, otherwise it starts a new one.
pub fn cluster_points(points: &[[f32; 2]], radius: f32) -> Vec<ScreenCluster> {
    let mut clusters: Vec<ScreenCluster> = Vec::new();

    for (i, &p) in points.iter().enumerate() {
        match clusters
            .iter_mut()
            .find(|c| distance(c.anchor, p) <= radius)
        {
            Some(cluster) => cluster.members.push(i),
            None => clusters.push(ScreenCluster {
                anchor: p,
                center: p,
                members: vec![i],
            }),
        }
    }

    for cluster in &mut clusters {
        let n = cluster.members.len() as f32;
        let (sx, sy) = cluster
            .members
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &i| (sx + points[i][0], sy + points[i][1]));
        cluster.center = [sx / n, sy / n];
    }
    clusters
}

/// One blob of the heat overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub center: [f32; 2],
    /// Point density relative to the densest cell, in `0..=1`.
    pub intensity: f32,
}

/// Bin points into square cells of side `radius` and normalise the counts.
pub fn heat_cells(points: &[[f32; 2]], radius: f32) -> Vec<HeatCell> {
    if points.is_empty() || radius <= 0.0 {
        return Vec::new();
    }

    let mut bins: BTreeMap<(i32, i32), (usize, f32, f32)> = BTreeMap::new();
    for p in points {
        let key = ((p[0] / radius).floor() as i32, (p[1] / radius).floor() as i32);
        let bin = bins.entry(key).or_insert((0, 0.0, 0.0));
        bin.0 += 1;
        bin.1 += p[0];
        bin.2 += p[1];
    }

    let max = bins.values().map(|b| b.0).max().unwrap_or(1) as f32;
    bins.into_values()
        .map(|(count, sx, sy)| HeatCell {
            center: [sx / count as f32, sy / count as f32],
            intensity: count as f32 / max,
        })
        .collect()
}
