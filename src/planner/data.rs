//! Roadmap graph extracted from (or seeded into) a multi-query planner.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerDataVertex {
    pub state: Vec<f64>,
    /// Planner-specific marker (e.g. connected component id)
    #[serde(default)]
    pub tag: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerDataEdge {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

/// Vertices and edges of a planner's search graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerData {
    vertices: Vec<PlannerDataVertex>,
    edges: Vec<PlannerDataEdge>,
}

impl PlannerData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, state: Vec<f64>) -> usize {
        self.vertices.push(PlannerDataVertex { state, tag: 0 });
        self.vertices.len() - 1
    }

    /// Add an edge between two existing vertices. Returns false if either
    /// endpoint is out of range.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) -> bool {
        if from >= self.vertices.len() || to >= self.vertices.len() {
            return false;
        }
        self.edges.push(PlannerDataEdge { from, to, weight });
        true
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[PlannerDataVertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[PlannerDataEdge] {
        &self.edges
    }

    /// Drop edges whose endpoints do not exist (e.g. after a partial load)
    pub fn retain_valid_edges(&mut self) -> usize {
        let count = self.vertices.len();
        let before = self.edges.len();
        self.edges.retain(|e| e.from < count && e.to < count);
        before - self.edges.len()
    }
}
