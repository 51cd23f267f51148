//! Wall face rebuilding
//!
//! Generated walls are flat rectangles tessellated into many small
//! triangles. Each connected coplanar face is replaced by one quad spanning
//! its extents.

use crate::graph::{Adjacency, MeshGraph, TriangleId, VertexAttributes, VertexId};
use crate::{log_reduction, MeshSimplifier, ReducedMesh};
use mapgen_core::{canonical_bits, Error, MeshBuffers, Point3f, Result, Vector3f};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

/// What to do with a face whose rebuilt quad would have zero area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DegenerateFacePolicy {
    /// Fail the whole mesh with [`Error::DegenerateFace`]
    #[default]
    Abort,
    /// Keep the face's original triangles and carry on
    Skip,
}

/// Corner order of the two rebuilt triangles, seen in the face's own
/// (width, height) plane with width increasing to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// `(bl, tl, br)` and `(br, tl, tr)`
    Clockwise,
    /// `(bl, br, tl)` and `(br, tr, tl)`
    CounterClockwise,
}

impl Winding {
    /// Pick the winding that keeps the quad facing along `normal`
    pub fn for_face(width_axis: usize, normal: &Vector3f) -> Self {
        let clockwise = if width_axis == 0 {
            normal.z < 0.0
        } else {
            normal.x > 0.0
        };
        if clockwise {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        }
    }

    fn triangles(self, bl: VertexId, tl: VertexId, br: VertexId, tr: VertexId) -> [[VertexId; 3]; 2] {
        match self {
            Winding::Clockwise => [[bl, tl, br], [br, tl, tr]],
            Winding::CounterClockwise => [[bl, br, tl], [br, tr, tl]],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallStats {
    pub faces: usize,
    pub rebuilt: usize,
    pub skipped: usize,
}

/// Replaces every flat wall face with two triangles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallRebuildReducer {
    pub on_degenerate: DegenerateFacePolicy,
}

impl WallRebuildReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(on_degenerate: DegenerateFacePolicy) -> Self {
        Self { on_degenerate }
    }

    /// Rebuild all faces of `graph` in place
    pub fn rebuild(&self, graph: &mut MeshGraph) -> Result<WallStats> {
        let faces = group_faces(graph);
        let mut stats = WallStats {
            faces: faces.len(),
            ..Default::default()
        };

        for face in &faces {
            if self.rebuild_face(graph, face)? {
                stats.rebuilt += 1;
            } else {
                stats.skipped += 1;
            }
        }

        debug!(
            faces = stats.faces,
            rebuilt = stats.rebuilt,
            skipped = stats.skipped,
            "Rebuilt wall faces"
        );
        Ok(stats)
    }

    /// Returns false when the face was skipped as degenerate
    fn rebuild_face(&self, graph: &mut MeshGraph, face: &[TriangleId]) -> Result<bool> {
        let normal = graph.triangle(face[0]).normal;
        let extents = FaceExtents::of(graph, face);
        let width_axis = if extents.extent(0) >= extents.extent(2) { 0 } else { 2 };
        let width = extents.extent(width_axis);
        let height = extents.extent(1);

        if !(width > 0.0 && height > 0.0) || normal == Vector3f::zeros() {
            match self.on_degenerate {
                DegenerateFacePolicy::Abort => {
                    return Err(Error::DegenerateFace {
                        normal: normal.into(),
                        width,
                        height,
                    });
                }
                DegenerateFacePolicy::Skip => {
                    warn!(
                        triangles = face.len(),
                        width,
                        height,
                        "Skipping degenerate wall face with normal {:?}",
                        normal
                    );
                    return Ok(false);
                }
            }
        }

        let left = graph.vertex(extents.min_vertex[width_axis]).attributes;
        let right = graph.vertex(extents.max_vertex[width_axis]).attributes;
        let (bottom, top) = (extents.min[1], extents.max[1]);
        let corner = |source: &VertexAttributes, y: f32| VertexAttributes {
            position: Point3f::new(source.position.x, y, source.position.z),
            normal,
            color: source.color,
            uv: source.uv,
        };

        for &t in face {
            graph.remove_triangle(t);
        }

        let bl = graph.insert_vertex(corner(&left, bottom));
        let tl = graph.insert_vertex(corner(&left, top));
        let br = graph.insert_vertex(corner(&right, bottom));
        let tr = graph.insert_vertex(corner(&right, top));

        for tri in Winding::for_face(width_axis, &normal).triangles(bl, tl, br, tr) {
            graph.add_triangle(tri);
        }
        Ok(true)
    }
}

impl MeshSimplifier for WallRebuildReducer {
    fn simplify(&self, mesh: &MeshBuffers) -> Result<ReducedMesh> {
        let start = Instant::now();
        let mut graph = MeshGraph::build(mesh, Adjacency::Triangles)?;
        self.rebuild(&mut graph)?;

        let reduced = graph.to_mesh();
        log_reduction("wall_rebuild", mesh, &reduced, start.elapsed());
        Ok(ReducedMesh::new(reduced))
    }
}

/// Axis-aligned extents of a face and the vertices that attain them
struct FaceExtents {
    min: [f32; 3],
    max: [f32; 3],
    min_vertex: [VertexId; 3],
    max_vertex: [VertexId; 3],
}

impl FaceExtents {
    fn of(graph: &MeshGraph, face: &[TriangleId]) -> Self {
        let first = graph.triangle(face[0]).vertices[0];
        let mut extents = Self {
            min: [f32::INFINITY; 3],
            max: [f32::NEG_INFINITY; 3],
            min_vertex: [first; 3],
            max_vertex: [first; 3],
        };

        for &t in face {
            for &v in &graph.triangle(t).vertices {
                let p = graph.vertex(v).position();
                for axis in 0..3 {
                    if p[axis] < extents.min[axis] {
                        extents.min[axis] = p[axis];
                        extents.min_vertex[axis] = v;
                    }
                    if p[axis] > extents.max[axis] {
                        extents.max[axis] = p[axis];
                        extents.max_vertex[axis] = v;
                    }
                }
            }
        }
        extents
    }

    fn extent(&self, axis: usize) -> f32 {
        self.max[axis] - self.min[axis]
    }
}

/// Union-find over triangle ids
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Partition live triangles into faces.
///
/// Two triangles belong to the same face when they have bitwise-equal face
/// normals and share a corner position; the relation is closed transitively.
/// Faces are returned in order of their first triangle.
pub fn group_faces(graph: &MeshGraph) -> Vec<Vec<TriangleId>> {
    let mut sets = DisjointSet::new(graph.triangle_ids().last().map_or(0, |t| t + 1));
    let mut first_seen: HashMap<([u32; 3], [u32; 3]), TriangleId> = HashMap::new();

    for t in graph.triangle_ids() {
        let tri = graph.triangle(t);
        let normal = bits(&tri.normal);
        for &v in &tri.vertices {
            let position = bits(&graph.vertex(v).position().coords);
            match first_seen.get(&(normal, position)) {
                Some(&other) => sets.union(t, other),
                None => {
                    first_seen.insert((normal, position), t);
                }
            }
        }
    }

    let mut face_of_root: HashMap<usize, usize> = HashMap::new();
    let mut faces: Vec<Vec<TriangleId>> = Vec::new();
    for t in graph.triangle_ids() {
        let root = sets.find(t);
        let face = *face_of_root.entry(root).or_insert_with(|| {
            faces.push(Vec::new());
            faces.len() - 1
        });
        faces[face].push(t);
    }
    faces
}

fn bits(v: &Vector3f) -> [u32; 3] {
    [canonical_bits(v.x), canonical_bits(v.y), canonical_bits(v.z)]
}
