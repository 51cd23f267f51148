//! Deduplicated vertex/triangle adjacency graph
//!
//! Vertices and triangles live in index-addressed arenas owned by
//! [`MeshGraph`]. Every cross reference is an arena index, so removing an
//! element only flags it and unlinks it from its neighbours.

use mapgen_core::{canonical_bits, Color, Error, MeshBuffers, Point3f, Result, Uv, Vector3f};
use std::collections::{BTreeSet, HashMap};

pub type VertexId = usize;
pub type TriangleId = usize;

/// Which adjacency the graph maintains besides vertex → triangle links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    /// Only triangle lists (type-specific reducers)
    Triangles,
    /// Triangle lists plus symmetric vertex neighbour sets (edge collapse)
    Neighbors,
}

/// Optional attribute buffers present on the source mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeLayout {
    pub normals: bool,
    pub colors: bool,
    pub uvs: bool,
}

impl AttributeLayout {
    pub fn of(mesh: &MeshBuffers) -> Self {
        Self {
            normals: mesh.normals.is_some(),
            colors: mesh.colors.is_some(),
            uvs: mesh.uvs.is_some(),
        }
    }
}

/// Per-vertex attributes; exact equality of all fields defines identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttributes {
    pub position: Point3f,
    pub normal: Vector3f,
    pub color: Color,
    pub uv: Uv,
}

type VertexKey = [u32; 12];

impl VertexAttributes {
    pub fn new(position: Point3f, normal: Vector3f) -> Self {
        Self {
            position,
            normal,
            color: [0.0; 4],
            uv: [0.0; 2],
        }
    }

    fn key(&self) -> VertexKey {
        let p = &self.position;
        let n = &self.normal;
        let c = &self.color;
        [
            canonical_bits(p.x),
            canonical_bits(p.y),
            canonical_bits(p.z),
            canonical_bits(n.x),
            canonical_bits(n.y),
            canonical_bits(n.z),
            canonical_bits(c[0]),
            canonical_bits(c[1]),
            canonical_bits(c[2]),
            canonical_bits(c[3]),
            canonical_bits(self.uv[0]),
            canonical_bits(self.uv[1]),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub attributes: VertexAttributes,
    pub(crate) neighbors: BTreeSet<VertexId>,
    pub(crate) triangles: Vec<TriangleId>,
    pub(crate) new_index: Option<u32>,
    /// Cached edge collapse cost and target (edge collapse only)
    pub(crate) cost: f32,
    pub(crate) collapse: Option<VertexId>,
    removed: bool,
}

impl Vertex {
    fn new(attributes: VertexAttributes) -> Self {
        Self {
            attributes,
            neighbors: BTreeSet::new(),
            triangles: Vec::new(),
            new_index: None,
            cost: 0.0,
            collapse: None,
            removed: false,
        }
    }

    pub fn position(&self) -> Point3f {
        self.attributes.position
    }

    pub fn neighbors(&self) -> &BTreeSet<VertexId> {
        &self.neighbors
    }

    pub fn triangles(&self) -> &[TriangleId] {
        &self.triangles
    }

    /// A vertex is live while at least one triangle references it
    pub fn is_live(&self) -> bool {
        !self.triangles.is_empty()
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [VertexId; 3],
    pub normal: Vector3f,
    removed: bool,
}

impl Triangle {
    pub fn has_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Deduplicated adjacency graph built from [`MeshBuffers`].
#[derive(Debug, Clone)]
pub struct MeshGraph {
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
    lookup: HashMap<VertexKey, VertexId>,
    adjacency: Adjacency,
    pub layout: AttributeLayout,
    live_vertices: usize,
    live_triangles: usize,
    source_vertex_count: usize,
}

impl MeshGraph {
    /// Create an empty graph
    pub fn new(adjacency: Adjacency, layout: AttributeLayout) -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            lookup: HashMap::new(),
            adjacency,
            layout,
            live_vertices: 0,
            live_triangles: 0,
            source_vertex_count: 0,
        }
    }

    /// Build a graph from flat buffers.
    ///
    /// All-zero index triples are skipped. A triple with a repeated index
    /// fails with [`Error::DegenerateTriangle`].
    pub fn build(mesh: &MeshBuffers, adjacency: Adjacency) -> Result<Self> {
        let triangles = checked_triangles(mesh)?;

        let mut graph = Self::new(adjacency, AttributeLayout::of(mesh));
        graph.source_vertex_count = mesh.vertex_count();
        graph.triangles.reserve(triangles.len());

        for (t, indices) in triangles {
            let corners = indices.map(|i| {
                let i = i as usize;
                graph.insert_vertex(VertexAttributes {
                    position: mesh.positions[i],
                    normal: mesh.normal(i),
                    color: mesh.color(i),
                    uv: mesh.uv(i),
                })
            });
            // Distinct indices can still dedup onto one vertex.
            if corners[0] == corners[1] || corners[0] == corners[2] || corners[1] == corners[2] {
                return Err(Error::DegenerateTriangle {
                    triangle: t,
                    indices,
                });
            }
            graph.add_triangle(corners);
        }

        Ok(graph)
    }

    pub fn adjacency(&self) -> Adjacency {
        self.adjacency
    }

    /// Vertex count of the buffers the graph was built from
    pub fn source_vertex_count(&self) -> usize {
        self.source_vertex_count
    }

    pub fn live_vertex_count(&self) -> usize {
        self.live_vertices
    }

    pub fn live_triangle_count(&self) -> usize {
        self.live_triangles
    }

    pub fn vertex(&self, v: VertexId) -> &Vertex {
        &self.vertices[v]
    }

    pub fn triangle(&self, t: TriangleId) -> &Triangle {
        &self.triangles[t]
    }

    pub(crate) fn vertex_mut(&mut self, v: VertexId) -> &mut Vertex {
        &mut self.vertices[v]
    }

    /// Ids of vertices not yet removed from the graph, live or not
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).filter(move |&v| !self.vertices[v].removed)
    }

    /// Ids of vertices referenced by at least one triangle
    pub fn live_vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).filter(move |&v| self.vertices[v].is_live())
    }

    pub fn triangle_ids(&self) -> impl Iterator<Item = TriangleId> + '_ {
        (0..self.triangles.len()).filter(move |&t| !self.triangles[t].removed)
    }

    /// Look up a vertex with these exact attributes, inserting it if absent
    pub fn insert_vertex(&mut self, attributes: VertexAttributes) -> VertexId {
        let key = attributes.key();
        if let Some(&v) = self.lookup.get(&key) {
            return v;
        }
        let v = self.vertices.len();
        self.vertices.push(Vertex::new(attributes));
        self.lookup.insert(key, v);
        v
    }

    /// Add a triangle over three distinct, present vertices
    pub fn add_triangle(&mut self, vertices: [VertexId; 3]) -> TriangleId {
        let [a, b, c] = vertices;
        assert!(a != b && a != c && b != c, "triangle repeats a vertex: {vertices:?}");
        assert!(
            vertices.iter().all(|&v| !self.vertices[v].removed),
            "triangle references a removed vertex: {vertices:?}"
        );

        let t = self.triangles.len();
        let normal = self.face_normal(vertices);
        self.triangles.push(Triangle {
            vertices,
            normal,
            removed: false,
        });
        self.live_triangles += 1;

        for &v in &vertices {
            self.attach(v, t);
        }
        if self.adjacency == Adjacency::Neighbors {
            self.link_corners(vertices);
        }
        t
    }

    /// Remove a triangle, detaching it from all three of its vertices
    pub fn remove_triangle(&mut self, t: TriangleId) {
        assert!(!self.triangles[t].removed, "triangle {t} removed twice");
        let vertices = self.triangles[t].vertices;

        for &v in &vertices {
            self.detach(v, t);
        }
        self.triangles[t].removed = true;
        self.live_triangles -= 1;

        if self.adjacency == Adjacency::Neighbors {
            for i in 0..3 {
                let i2 = (i + 1) % 3;
                self.remove_if_non_neighbor(vertices[i], vertices[i2]);
                self.remove_if_non_neighbor(vertices[i2], vertices[i]);
            }
        }
    }

    /// Re-point one corner of triangle `t` from `old` to `new`
    pub fn replace_vertex(&mut self, t: TriangleId, old: VertexId, new: VertexId) {
        let tri = &mut self.triangles[t];
        assert!(!tri.removed, "replacing a vertex of removed triangle {t}");
        assert!(tri.has_vertex(old), "triangle {t} does not reference vertex {old}");
        assert!(!tri.has_vertex(new), "triangle {t} already references vertex {new}");

        let slot = tri.vertices.iter().position(|&v| v == old).unwrap_or_default();
        tri.vertices[slot] = new;
        let vertices = tri.vertices;

        self.detach(old, t);
        self.attach(new, t);

        if self.adjacency == Adjacency::Neighbors {
            for &v in &vertices {
                self.remove_if_non_neighbor(old, v);
                self.remove_if_non_neighbor(v, old);
            }
            self.link_corners(vertices);
        }

        self.triangles[t].normal = self.face_normal(vertices);
    }

    /// Drop a vertex that no triangle references any more
    pub fn remove_vertex(&mut self, v: VertexId) {
        assert!(
            self.vertices[v].triangles.is_empty(),
            "vertex {v} still owns {} triangles",
            self.vertices[v].triangles.len()
        );
        let neighbors = std::mem::take(&mut self.vertices[v].neighbors);
        for n in neighbors {
            self.vertices[n].neighbors.remove(&v);
        }

        let key = self.vertices[v].attributes.key();
        if self.lookup.get(&key) == Some(&v) {
            self.lookup.remove(&key);
        }
        self.vertices[v].removed = true;
    }

    /// Remove a vertex together with every triangle that uses it.
    ///
    /// Other corners of those triangles die too if this leaves them without
    /// triangles; they stay in the lookup table until compaction.
    pub fn kill_vertex(&mut self, v: VertexId) {
        while let Some(&t) = self.vertices[v].triangles.last() {
            self.remove_triangle(t);
        }
        self.remove_vertex(v);
    }

    /// Emit live vertices and triangles as compacted buffers.
    ///
    /// Indices are reassigned sequentially in vertex insertion order.
    pub fn to_mesh(&mut self) -> MeshBuffers {
        let mut positions = Vec::with_capacity(self.live_vertices);
        let mut normals = Vec::new();
        let mut colors = Vec::new();
        let mut uvs = Vec::new();

        let mut next = 0u32;
        for vertex in &mut self.vertices {
            if !vertex.is_live() {
                vertex.new_index = None;
                continue;
            }
            vertex.new_index = Some(next);
            next += 1;

            let attrs = &vertex.attributes;
            positions.push(attrs.position);
            normals.push(attrs.normal);
            colors.push(attrs.color);
            uvs.push(attrs.uv);
        }

        let mut indices = Vec::with_capacity(self.live_triangles * 3);
        for tri in self.triangles.iter().filter(|t| !t.removed) {
            for &v in &tri.vertices {
                let index = self.vertices[v]
                    .new_index
                    .expect("live triangle references a dead vertex");
                indices.push(index);
            }
        }

        MeshBuffers {
            positions,
            normals: self.layout.normals.then_some(normals),
            colors: self.layout.colors.then_some(colors),
            uvs: self.layout.uvs.then_some(uvs),
            indices,
        }
    }

    /// Unit face normal, or zero for a degenerate triangle
    fn face_normal(&self, [a, b, c]: [VertexId; 3]) -> Vector3f {
        let p0 = self.vertices[a].position();
        let p1 = self.vertices[b].position();
        let p2 = self.vertices[c].position();
        (p1 - p0)
            .cross(&(p2 - p0))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3f::zeros)
    }

    fn attach(&mut self, v: VertexId, t: TriangleId) {
        let vertex = &mut self.vertices[v];
        debug_assert!(!vertex.triangles.contains(&t));
        if vertex.triangles.is_empty() {
            self.live_vertices += 1;
        }
        vertex.triangles.push(t);
    }

    fn detach(&mut self, v: VertexId, t: TriangleId) {
        let vertex = &mut self.vertices[v];
        let pos = vertex
            .triangles
            .iter()
            .position(|&x| x == t)
            .unwrap_or_else(|| panic!("triangle {t} missing from vertex {v}"));
        vertex.triangles.remove(pos);
        if vertex.triangles.is_empty() {
            self.live_vertices -= 1;
        }
    }

    fn link_corners(&mut self, vertices: [VertexId; 3]) {
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    self.vertices[vertices[i]].neighbors.insert(vertices[j]);
                }
            }
        }
    }

    /// Unlink `other` from `v` unless some triangle of `v` still uses it
    fn remove_if_non_neighbor(&mut self, v: VertexId, other: VertexId) {
        if !self.vertices[v].neighbors.contains(&other) {
            return;
        }
        let shared = self.vertices[v]
            .triangles
            .iter()
            .any(|&t| self.triangles[t].has_vertex(other));
        if !shared {
            self.vertices[v].neighbors.remove(&other);
        }
    }
}

/// Source index triples that passed the input checks, with their position
/// in the source index list.
///
/// All-zero triples are padding and are dropped. Fails with
/// [`Error::DegenerateInput`] when the index count is not a multiple of 3,
/// with [`Error::InvalidData`] on bad buffers, and with
/// [`Error::DegenerateTriangle`] when a triple repeats an index.
pub fn checked_triangles(mesh: &MeshBuffers) -> Result<Vec<(usize, [u32; 3])>> {
    if mesh.indices.len() % 3 != 0 {
        return Err(Error::DegenerateInput {
            index_count: mesh.indices.len(),
        });
    }
    mesh.validate()?;

    let mut triangles = Vec::with_capacity(mesh.triangle_count());
    for (t, indices) in mesh.triangles().enumerate() {
        let [a, b, c] = indices;
        if a == 0 && b == 0 && c == 0 {
            continue;
        }
        if a == b || a == c || b == c {
            return Err(Error::DegenerateTriangle {
                triangle: t,
                indices,
            });
        }
        triangles.push((t, indices));
    }
    Ok(triangles)
}
