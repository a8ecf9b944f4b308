use geometry_view::ndarray::{Array3, Array4};
use geometry_view::parse::ParsedView;
use geometry_view::{Annotations, ByteOrder, GeometryView, GridSnapshot, Material, ViewKind};

/// every `ID` entry is unique and encodes its own position
fn unique_arrays(n: [usize; 3]) -> (Array3<u32>, Array4<u32>) {
    let solid = Array3::zeros((n[0], n[1], n[2]));
    let id = Array4::from_shape_fn((3, n[0] + 1, n[1] + 1, n[2] + 1), |(a, i, j, k)| {
        (a * 1000000 + i * 10000 + j * 100 + k) as u32
    });
    (solid, id)
}

fn export(view: &GeometryView, grid: &GridSnapshot<'_>, order: ByteOrder) -> ParsedView {
    let bytes = geometry_view::write_view(Vec::new(), view, grid, &Annotations::default(), order)
        .unwrap();
    geometry_view::parse_geometry_view(&bytes).unwrap()
}

#[test]
fn two_by_one_by_one_region() {
    let (solid, id) = unique_arrays([4, 4, 4]);
    let grid = GridSnapshot::new([1.0; 3], solid.view(), id.view()).unwrap();
    let view = GeometryView::new([0; 3], [2, 1, 1], [1; 3], "edges", ViewKind::Edge).unwrap();

    let parsed = export(&view, &grid, ByteOrder::LittleEndian);

    assert_eq!(parsed.file_type, "PolyData");
    assert_eq!(parsed.piece_count("NumberOfPoints"), Some(12));
    assert_eq!(parsed.piece_count("NumberOfLines"), Some(20));

    let points = parsed.points().unwrap().values::<f32>().unwrap();
    assert_eq!(points.len(), 12 * 3);

    let connectivity = parsed.array("connectivity").unwrap().values::<u32>().unwrap();
    assert_eq!(connectivity.len(), 40);

    // 8 x-edges, then 6 y-edges, then 6 z-edges
    let lines: Vec<_> = connectivity.chunks(2).map(|pair| pair[1] - pair[0]).collect();
    assert!(lines[..8].iter().all(|step| *step == 4));
    assert!(lines[8..14].iter().all(|step| *step == 2));
    assert!(lines[14..].iter().all(|step| *step == 1));

    let offsets = parsed.array("offsets").unwrap().values::<u32>().unwrap();
    let expected: Vec<u32> = (1..=20).map(|n| 2 * n).collect();
    assert_eq!(offsets, expected);

    let ids = parsed.array("Material").unwrap().values::<u32>().unwrap();
    assert_eq!(ids.len(), 20);
}

#[test]
fn declared_offsets_are_cumulative() {
    let (solid, id) = unique_arrays([3, 3, 3]);
    let grid = GridSnapshot::new([1.0; 3], solid.view(), id.view()).unwrap();
    let view = GeometryView::new([0; 3], [2, 1, 1], [1; 3], "edges", ViewKind::Edge).unwrap();

    let parsed = export(&view, &grid, ByteOrder::LittleEndian);
    let offsets: Vec<_> = parsed.arrays.iter().map(|a| a.declared.offset).collect();

    let points = 12 * 3 * 4;
    let connectivity = 20 * 2 * 4;
    let line_offsets = 20 * 4;

    assert_eq!(
        offsets,
        vec![
            0,
            4 + points,
            4 + points + 4 + connectivity,
            4 + points + 4 + connectivity + 4 + line_offsets,
        ]
    );

    let components: Vec<_> = parsed.arrays.iter().map(|a| a.declared.components).collect();
    assert_eq!(components, vec![3, 1, 1, 1]);
}

/// the identifiers in the order the lines are emitted: x block, y block, z block
fn expected_ids(id: &Array4<u32>, start: [usize; 3], end: [usize; 3]) -> Vec<u32> {
    let [xs, ys, zs] = start;
    let [xf, yf, zf] = end;
    let mut expected = Vec::new();

    for i in xs..xf {
        for j in ys..=yf {
            for k in zs..=zf {
                expected.push(id[[0, i, j, k]]);
            }
        }
    }

    for i in xs..=xf {
        for j in ys..yf {
            for k in zs..=zf {
                expected.push(id[[1, i, j, k]]);
            }
        }
    }

    for i in xs..=xf {
        for j in ys..=yf {
            for k in zs..zf {
                expected.push(id[[2, i, j, k]]);
            }
        }
    }

    expected
}

#[test]
fn identifiers_follow_line_order() {
    let (solid, id) = unique_arrays([6, 5, 7]);
    let grid = GridSnapshot::new([1.0; 3], solid.view(), id.view()).unwrap();

    let start = [1, 0, 2];
    let end = [4, 2, 5];
    let view = GeometryView::new(start, end, [1; 3], "edges", ViewKind::Edge).unwrap();

    let parsed = export(&view, &grid, ByteOrder::LittleEndian);
    let ids = parsed.array("Material").unwrap().values::<u32>().unwrap();

    let [nx, ny, nz] = [3, 2, 3];
    let [px, py, pz] = [nx + 1, ny + 1, nz + 1];
    assert_eq!(ids.len(), nx * py * pz + px * ny * pz + px * py * nz);

    assert_eq!(ids, expected_ids(&id, start, end));
}

#[test]
fn every_line_carries_the_id_of_its_edge() {
    let (solid, id) = unique_arrays([6, 6, 6]);
    let grid = GridSnapshot::new([1.0; 3], solid.view(), id.view()).unwrap();

    // a strided region: samples 1, 3, 5 along x and 0, 2 along z
    let view = GeometryView::new([1, 2, 0], [5, 4, 4], [2, 1, 2], "edges", ViewKind::Edge).unwrap();

    let parsed = export(&view, &grid, ByteOrder::LittleEndian);
    let points = parsed.points().unwrap().values::<f32>().unwrap();
    let connectivity = parsed.array("connectivity").unwrap().values::<u32>().unwrap();
    let ids = parsed.array("Material").unwrap().values::<u32>().unwrap();

    let point = |index: u32| {
        let p = index as usize * 3;
        [points[p] as usize, points[p + 1] as usize, points[p + 2] as usize]
    };

    assert_eq!(connectivity.len(), 2 * ids.len());

    for (line, pair) in connectivity.chunks(2).enumerate() {
        let from = point(pair[0]);
        let to = point(pair[1]);

        // exactly one coordinate changes, by the stride of that axis
        let moved: Vec<_> = (0..3).filter(|a| from[*a] != to[*a]).collect();
        assert_eq!(moved.len(), 1, "line {line} joins {from:?} and {to:?}");
        let axis = moved[0];
        assert_eq!(to[axis] - from[axis], view.stride()[axis]);

        assert_eq!(ids[line], id[[axis, from[0], from[1], from[2]]]);
    }
}

#[test]
fn strided_vertices_stay_inside_the_region() {
    let (solid, id) = unique_arrays([10, 10, 10]);
    let grid = GridSnapshot::new([1.0; 3], solid.view(), id.view()).unwrap();

    // stride 2 does not divide 5 cells: vertices 0, 2, 4 along x
    let view = GeometryView::new([0; 3], [5, 1, 1], [2, 1, 1], "edges", ViewKind::Edge).unwrap();
    assert_eq!(view.sampled_vertices(), [3, 2, 2]);

    let parsed = export(&view, &grid, ByteOrder::LittleEndian);
    assert_eq!(parsed.piece_count("NumberOfPoints"), Some(12));
    assert_eq!(parsed.piece_count("NumberOfLines"), Some(20));

    let points = parsed.points().unwrap().values::<f32>().unwrap();
    let max_x = points.chunks(3).map(|p| p[0]).fold(0.0, f32::max);
    assert_eq!(max_x, 4.0);

    // x edges start at vertices 0 and 2 only
    let ids = parsed.array("Material").unwrap().values::<u32>().unwrap();
    assert!(ids[..8].iter().all(|id| (id / 10000) % 100 <= 2));
    assert!(ids.iter().all(|id| (id / 10000) % 100 <= 4));
}

#[test]
fn points_use_physical_units() {
    let (solid, id) = unique_arrays([2, 2, 2]);
    let grid = GridSnapshot::new([0.5, 0.25, 0.125], solid.view(), id.view()).unwrap();
    let view = GeometryView::new([1, 1, 1], [2, 2, 2], [1; 3], "edges", ViewKind::Edge).unwrap();

    let parsed = export(&view, &grid, ByteOrder::BigEndian);
    assert_eq!(parsed.byte_order, ByteOrder::BigEndian);

    let points = parsed.points().unwrap().values::<f32>().unwrap();
    assert_eq!(&points[..6], &[0.5, 0.25, 0.125, 0.5, 0.25, 0.25]);
    assert_eq!(&points[points.len() - 3..], &[1.0, 0.5, 0.25]);
}

#[test]
fn legend_lists_materials_only() {
    let (solid, id) = unique_arrays([2, 2, 2]);
    let materials = vec![
        Material::new(0, "pec".into()),
        Material::new(1, "free_space".into()),
        Material::new(2, "soil & water".into()),
    ];
    let grid = GridSnapshot::new([1.0; 3], solid.view(), id.view())
        .unwrap()
        .with_materials(&materials);
    let view = GeometryView::new([0; 3], [2; 3], [1; 3], "edges", ViewKind::Edge).unwrap();

    let parsed = export(&view, &grid, ByteOrder::LittleEndian);

    assert_eq!(
        parsed.legend_entries("Material"),
        vec![("pec", 0), ("free_space", 1), ("soil & water", 2)]
    );
    assert!(parsed.legend_entries("PML").is_empty());
    assert!(parsed.legend_entries("Sources_Receivers").is_empty());
}

#[test]
fn empty_region_writes_a_single_point() {
    let (solid, id) = unique_arrays([2, 2, 2]);
    let grid = GridSnapshot::new([1.0; 3], solid.view(), id.view()).unwrap();
    let view = GeometryView::new([1; 3], [1; 3], [1; 3], "edges", ViewKind::Edge).unwrap();

    let parsed = export(&view, &grid, ByteOrder::LittleEndian);

    assert_eq!(parsed.piece_count("NumberOfPoints"), Some(1));
    assert_eq!(parsed.piece_count("NumberOfLines"), Some(0));
    assert!(parsed.array("Material").unwrap().values::<u32>().unwrap().is_empty());
}
