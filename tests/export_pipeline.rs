//! End-to-end tests of the export batch

use anyhow::Result;
use approx::assert_relative_eq;
use mapgen::prelude::*;
use nalgebra::Vector3;

/// Flat grid in the XZ plane with `size` x `size` vertices at height `y`
fn grid(size: usize, y: f32) -> MeshBuffers {
    let mut positions = Vec::new();
    for z in 0..size {
        for x in 0..size {
            positions.push(Point3f::new(x as f32, y, z as f32));
        }
    }
    let mut indices = Vec::new();
    for z in 0..(size - 1) {
        for x in 0..(size - 1) {
            let tl = (z * size + x) as u32;
            let tr = tl + 1;
            let bl = ((z + 1) * size + x) as u32;
            let br = bl + 1;
            indices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
        }
    }
    MeshBuffers::from_positions_and_indices(positions, indices)
}

/// Wall in the XY plane facing +Z, tessellated into 4 x 4 cells
fn wall() -> MeshBuffers {
    let mut positions = Vec::new();
    for y in 0..5 {
        for x in 0..5 {
            positions.push(Point3f::new(x as f32 * 2.0, y as f32, 0.0));
        }
    }
    let mut indices = Vec::new();
    for y in 0..4u32 {
        for x in 0..4u32 {
            let a = y * 5 + x;
            let c = a + 5;
            indices.extend_from_slice(&[a, a + 1, c, a + 1, c + 1, c]);
        }
    }
    let mut mesh = MeshBuffers::from_positions_and_indices(positions, indices);
    mesh.set_normals(vec![Vector3f::z(); mesh.vertex_count()]);
    mesh
}

/// Two stacked 10 x 10 slabs, bottom at y = 0 and top at y = 10
fn floor() -> MeshBuffers {
    let mut bottom = grid(3, 0.0);
    let top = grid(3, 10.0);
    let offset = bottom.vertex_count() as u32;
    bottom.positions.extend(top.positions);
    bottom.indices.extend(top.indices.iter().map(|i| i + offset));
    bottom
}

fn water(heights: [f32; 4]) -> MeshBuffers {
    MeshBuffers::from_positions_and_indices(
        vec![
            Point3f::new(0.0, heights[0], 0.0),
            Point3f::new(0.0, heights[1], 1.0),
            Point3f::new(1.0, heights[2], 0.0),
            Point3f::new(1.0, heights[3], 1.0),
        ],
        vec![0, 1, 2, 2, 1, 3],
    )
}

fn find(output: &ExportOutput, semantic: SemanticType) -> &CombinedMesh {
    output
        .meshes
        .iter()
        .find(|m| m.semantic == semantic)
        .unwrap_or_else(|| panic!("no {semantic} mesh in output"))
}

fn sample_sources() -> Vec<SourceMesh> {
    let shift = Transform3D::translation(Vector3::new(100.0, 0.0, 0.0));
    vec![
        SourceMesh::new("road", grid(8, 0.0), Transform3D::identity(), SemanticType::Generic),
        SourceMesh::new("lake", water([1.0, 3.0, 2.0, 2.5]), Transform3D::identity(), SemanticType::Water),
        SourceMesh::new("info Node 3", grid(4, 0.0), Transform3D::identity(), SemanticType::Generic),
        SourceMesh::new("house wall", wall(), shift, SemanticType::Wall),
        SourceMesh::new("house floor", floor(), Transform3D::identity(), SemanticType::Floor),
        SourceMesh::new("pond", water([4.0, 6.0, 5.0, 5.0]), shift, SemanticType::Water),
    ]
}

#[test]
fn test_full_batch() -> Result<()> {
    let sources = sample_sources();
    let output = ExportBatch::new(ExportConfig::default()).run(&sources)?;

    // One mesh per semantic type present, the info node dropped
    assert_eq!(output.meshes.len(), 4);
    let all_sources: usize = output.meshes.iter().map(|m| m.sources.len()).sum();
    assert_eq!(all_sources, 5);
    assert!(output
        .meshes
        .iter()
        .all(|m| m.sources.iter().all(|(index, _)| *index != 2)));

    // Edge collapse keeps at most 90% of the grid
    let road = find(&output, SemanticType::Generic);
    assert!(road.mesh.vertex_count() <= 57);

    // Wall rebuilt to one quad, moved by its transform
    let wall = find(&output, SemanticType::Wall);
    assert_eq!(wall.mesh.vertex_count(), 4);
    assert_eq!(wall.mesh.triangle_count(), 2);
    let (min, max) = wall.mesh.bounding_box();
    assert_relative_eq!(min, Point3f::new(100.0, 0.0, 0.0));
    assert_relative_eq!(max, Point3f::new(108.0, 4.0, 0.0));

    // Floor keeps only its top slab
    let floor = find(&output, SemanticType::Floor);
    assert_eq!(floor.mesh.vertex_count(), 9);
    assert!(floor.mesh.positions.iter().all(|p| p.y == 10.0));

    // Both water sources share one mesh, flattened to the lowest height
    let water = find(&output, SemanticType::Water);
    assert_eq!(water.sources.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 5]);
    assert_eq!(water.mesh.vertex_count(), 8);
    assert!(water.mesh.positions.iter().all(|p| p.y == 1.0));
    assert_eq!(water.mesh.positions[4].x, 100.0);

    let expected_wastage: usize = output
        .meshes
        .iter()
        .map(|m| MAX_MESH_VERTICES - m.mesh.vertex_count())
        .sum();
    assert_eq!(output.wastage, expected_wastage);

    for mesh in &output.meshes {
        mesh.mesh.validate()?;
        assert_eq!(mesh.mesh.indices_u16()?.len(), mesh.mesh.indices.len());
    }
    Ok(())
}

#[test]
fn test_small_capacity_splits_groups() -> Result<()> {
    let sources: Vec<SourceMesh> = (0..5)
        .map(|i| SourceMesh::new(format!("tile {i}"), grid(4, 0.0), Transform3D::identity(), SemanticType::Generic))
        .collect();
    let config = ExportConfig::default()
        .with_reducer(ReducerConfig::disabled())
        .with_combiner(CombinerConfig::new().with_capacity(40));

    let output = ExportBatch::new(config).run(&sources)?;
    // 16 vertices each, two per group
    assert_eq!(output.meshes.len(), 3);
    assert_eq!(output.meshes[0].mesh.vertex_count(), 32);
    assert_eq!(output.meshes[2].mesh.vertex_count(), 16);
    assert_eq!(output.wastage, 8 + 8 + 24);
    Ok(())
}

#[test]
fn test_mixed_types_without_partitioning() -> Result<()> {
    let sources = sample_sources();
    let config = ExportConfig::default().with_combiner(CombinerConfig::new().with_partition_by_type(false));

    let output = ExportBatch::new(config).run(&sources)?;
    assert_eq!(output.meshes.len(), 1);
    assert_eq!(output.meshes[0].semantic, SemanticType::Generic);
    // A mixed group is not water, so nothing is flattened
    assert!(output.meshes[0].mesh.positions.iter().any(|p| p.y == 3.0));
    Ok(())
}

#[test]
fn test_oversized_source_is_reported() {
    let sources = vec![SourceMesh::new(
        "terrain",
        grid(10, 0.0),
        Transform3D::identity(),
        SemanticType::Water,
    )];
    let config = ExportConfig::default().with_combiner(CombinerConfig::new().with_capacity(50));

    let err = ExportBatch::new(config).run(&sources).unwrap_err();
    assert_eq!(
        err,
        Error::OversizedMesh {
            source_index: 0,
            vertex_count: 100,
            capacity: 50
        }
    );
}

#[test]
fn test_degenerate_source_fails_batch() {
    let broken = MeshBuffers::from_positions_and_indices(
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
        ],
        vec![0, 1, 2, 2, 2, 3],
    );
    let sources = vec![
        SourceMesh::new("ok", grid(3, 0.0), Transform3D::identity(), SemanticType::Generic),
        SourceMesh::new("broken", broken, Transform3D::identity(), SemanticType::Generic),
    ];

    let err = ExportBatch::default().run(&sources).unwrap_err();
    assert!(matches!(err, Error::DegenerateTriangle { triangle: 1, .. }));
}

#[test]
fn test_water_padding_triangles_are_dropped() -> Result<()> {
    let mut padded = water([2.0, 2.0, 2.0, 2.0]);
    padded.indices.splice(0..0, [0, 0, 0]);
    let sources = vec![
        SourceMesh::new("padded lake", padded, Transform3D::identity(), SemanticType::Water),
        SourceMesh::new("pond", water([1.0, 1.0, 1.0, 1.0]), Transform3D::identity(), SemanticType::Water),
    ];

    let output = ExportBatch::default().run(&sources)?;
    let water = find(&output, SemanticType::Water);
    assert_eq!(water.mesh.indices, vec![0, 1, 2, 2, 1, 3, 4, 5, 6, 6, 5, 7]);
    water.mesh.validate()?;
    Ok(())
}

#[test]
fn test_water_with_partial_triangle_fails_batch() {
    let mut partial = water([1.0, 1.0, 1.0, 1.0]);
    partial.indices.push(0);
    let sources = vec![
        SourceMesh::new("broken lake", partial, Transform3D::identity(), SemanticType::Water),
        SourceMesh::new("pond", water([1.0, 1.0, 1.0, 1.0]), Transform3D::identity(), SemanticType::Water),
    ];

    let err = ExportBatch::default().run(&sources).unwrap_err();
    assert_eq!(err, Error::DegenerateInput { index_count: 7 });
}

#[test]
fn test_config_round_trips_through_serde() -> Result<()> {
    let config = ExportConfig::default()
        .with_filter_info_nodes(false)
        .with_reducer(ReducerConfig::default().with_degenerate_faces(DegenerateFacePolicy::Skip));
    let json = serde_json::to_string(&config)?;
    let back: ExportConfig = serde_json::from_str(&json)?;
    assert_eq!(back, config);
    Ok(())
}
