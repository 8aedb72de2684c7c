//! Graph coloring over DIMACS-style instances.

use tracing::debug;

use crate::{
    error::{Result, SolverError},
    solver::{csp::Csp, expr::Var},
};

/// A simple undirected graph, stored as an adjacency matrix.
#[derive(Debug, Clone)]
pub struct ColoringInstance {
    adjacency: Vec<Vec<bool>>,
    edges: usize,
}

impl ColoringInstance {
    /// Builds an instance from 0-indexed edges. Self-loops and duplicate
    /// edges are ignored.
    pub fn from_edges(vertices: usize, edges: &[(usize, usize)]) -> Self {
        let mut instance = Self {
            adjacency: vec![vec![false; vertices]; vertices],
            edges: 0,
        };
        for &(u, v) in edges {
            instance.connect(u, v);
        }
        instance
    }

    fn connect(&mut self, u: usize, v: usize) {
        if u != v && !self.adjacency[u][v] {
            self.adjacency[u][v] = true;
            self.adjacency[v][u] = true;
            self.edges += 1;
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    pub fn adjacent(&self, u: usize, v: usize) -> bool {
        self.adjacency[u][v]
    }
}

/// Reads a DIMACS graph: `c` lines are comments, `p edge V E` declares
/// the size, and each `e u v` line (1-indexed) declares an undirected
/// edge. Duplicate edges are not double-counted.
pub fn parse_dimacs(input: &str) -> Result<ColoringInstance> {
    let mut instance: Option<ColoringInstance> = None;

    for (line_no, line) in input.lines().enumerate() {
        let mut fields = line.split_whitespace();
        match fields.next() {
            None | Some("c") => continue,
            Some("p") => {
                let vertices = fields
                    .nth(1)
                    .and_then(|field| field.parse::<usize>().ok())
                    .ok_or_else(|| {
                        SolverError::MalformedInstance(format!(
                            "line {}: bad problem line '{line}'",
                            line_no + 1
                        ))
                    })?;
                instance = Some(ColoringInstance::from_edges(vertices, &[]));
            }
            Some("e") => {
                let instance = instance.as_mut().ok_or_else(|| {
                    SolverError::MalformedInstance(format!(
                        "line {}: edge before the problem line",
                        line_no + 1
                    ))
                })?;
                let mut endpoint = || {
                    fields
                        .next()
                        .and_then(|field| field.parse::<usize>().ok())
                        .filter(|&v| v >= 1 && v <= instance.vertex_count())
                };
                match (endpoint(), endpoint()) {
                    (Some(u), Some(v)) => instance.connect(u - 1, v - 1),
                    _ => {
                        return Err(SolverError::MalformedInstance(format!(
                            "line {}: bad edge line '{line}'",
                            line_no + 1
                        ))
                        .into())
                    }
                }
            }
            Some(_) => continue,
        }
    }

    let instance = instance.ok_or_else(|| {
        SolverError::MalformedInstance("missing problem line".to_string())
    })?;
    debug!(
        vertices = instance.vertex_count(),
        edges = instance.edge_count(),
        "parsed DIMACS graph"
    );
    Ok(instance)
}

/// Builds the coloring problem: one variable per vertex over
/// `[1, colors]`, one disequality per edge.
pub fn coloring_csp(instance: &ColoringInstance, colors: i64) -> Result<(Csp, Vec<Var>)> {
    let mut csp = Csp::new();
    let vars: Vec<Var> = (0..instance.vertex_count())
        .map(|i| csp.add_variable(format!("x{i}"), 1, colors))
        .collect::<Result<_>>()?;

    for u in 0..instance.vertex_count() {
        for v in (u + 1)..instance.vertex_count() {
            if instance.adjacent(u, v) {
                csp.add_linear(vars[u].ne(vars[v])?)?;
            }
        }
    }

    Ok((csp, vars))
}

/// Checks a coloring without going through the solver: every vertex must
/// hold a value and adjacent vertices must differ.
pub fn verify_coloring(instance: &ColoringInstance, assignments: &[Option<i64>]) -> bool {
    let n = instance.vertex_count();
    if assignments.len() != n || assignments.iter().any(Option::is_none) {
        return false;
    }
    for u in 0..n {
        for v in (u + 1)..n {
            if instance.adjacent(u, v) && assignments[u] == assignments[v] {
                return false;
            }
        }
    }
    true
}
