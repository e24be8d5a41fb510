//! Integration tests for convex hull computation

use approx::assert_relative_eq;
use directories::ProjectDirs;
use math_convex_hull::{
    ConvexHull3D, ConvexHullError, HullMesh, export_obj, get_convex_hull, testdata,
};
use math_geometry::{Point3D, relative_epsilon};
use std::fs;
use std::path::PathBuf;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Get the data directory using the directories crate
fn get_data_dir() -> PathBuf {
    match ProjectDirs::from("org", "math-geometry", "math-convex-hull") {
        Some(dirs) => dirs.cache_dir().to_path_buf(),
        None => std::env::temp_dir().join("math-convex-hull"),
    }
}

/// Every input point is inside or on every face plane
fn assert_convex(hull: &ConvexHull3D, points: &[Point3D]) {
    let eps = relative_epsilon(points) * 10.0;
    for t in hull.triangles() {
        let plane = t.to_triangle();
        for p in points {
            let d = plane.distance_from_plane(p);
            assert!(d <= eps, "point {} is {} outside face {:?}", p, d, t.indices());
        }
    }
}

/// Build, check the hull properties, export an OBJ
fn run_hull_test(name: &str, points: Vec<Point3D>, expected_min_faces: usize) -> ConvexHull3D {
    init_logging();
    let hull = get_convex_hull(&points)
        .expect("hull construction failed")
        .expect("hull came back empty");

    assert!(
        hull.num_faces() >= expected_min_faces,
        "Expected at least {} faces, got {}",
        expected_min_faces,
        hull.num_faces()
    );
    assert!(hull.num_vertices() >= 4);
    assert!(hull.volume() > 0.0, "Volume must be positive");
    assert!(hull.is_closed(), "hull {} is not a closed surface", name);
    assert_convex(&hull, &points);

    let output_dir = get_data_dir().join("convexhull3d");
    if fs::create_dir_all(&output_dir).is_ok() {
        let obj_path = output_dir.join(format!("convhull_{}.obj", name));
        export_obj(&hull, &obj_path).expect("Failed to export OBJ");
    }

    hull
}

#[test]
fn test_unit_corner_tetrahedron() {
    let points = vec![
        Point3D::new(0.0, 0.0, 0.0),
        Point3D::new(1.0, 0.0, 0.0),
        Point3D::new(0.0, 1.0, 0.0),
        Point3D::new(0.0, 0.0, 1.0),
    ];
    let hull = run_hull_test("corner_tetrahedron", points, 4);
    assert_eq!(hull.num_faces(), 4);
    assert_eq!(hull.used_point_indices(), vec![0, 1, 2, 3]);
    assert_relative_eq!(
        hull.surface_area(),
        1.5 + 3.0_f64.sqrt() / 2.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_regular_tetrahedron() {
    let hull = run_hull_test("tetrahedron", testdata::tetrahedron_vertices(), 4);
    assert_eq!(hull.num_faces(), 4);
}

#[test]
fn test_cube() {
    let hull = run_hull_test("cube", testdata::cube_vertices(2.0), 12);
    assert_eq!(hull.num_faces(), 12);
    assert_relative_eq!(hull.volume(), 8.0, epsilon = 1e-9);
    assert_relative_eq!(hull.surface_area(), 24.0, epsilon = 1e-9);
}

#[test]
fn test_octahedron() {
    let hull = run_hull_test("octahedron", testdata::octahedron_vertices(), 8);
    assert_eq!(hull.num_faces(), 8);
    assert_relative_eq!(hull.volume(), 4.0 / 3.0, epsilon = 1e-9);
}

#[test]
fn test_icosahedron() {
    let hull = run_hull_test("icosahedron", testdata::icosahedron_vertices(), 20);
    assert_eq!(hull.num_faces(), 20);
    assert_eq!(hull.num_vertices(), 12);
}

#[test]
fn test_random_sphere_936() {
    let points = testdata::random_sphere_points_seeded(936, 1.0, 936);
    run_hull_test("rand_sph_936", points, 100);
}

#[test]
fn test_fibonacci_sphere_840() {
    let points = testdata::fibonacci_sphere_points(840, 1.0);
    let hull = run_hull_test("fib_sph_840", points, 500);
    // Every lattice point is extreme
    assert_eq!(hull.num_vertices(), 840);
    assert_eq!(hull.num_faces(), 2 * 840 - 4);
}

#[test]
fn test_cube_with_interior_1000() {
    let points = testdata::cube_with_interior_points(2.0, 1000);
    let hull = run_hull_test("cube_interior_1000", points, 12);
    assert_eq!(hull.num_vertices(), 8);
    assert_relative_eq!(hull.volume(), 8.0, epsilon = 1e-9);
}

#[test]
fn test_rebuild_from_hull_vertices_is_equivalent() {
    let points = testdata::random_box_points(500, 3.0, 17);
    let first = run_hull_test("idempotence_first", points, 4);
    let again = get_convex_hull(&first.used_points()).unwrap().unwrap();

    assert_eq!(again.num_vertices(), first.num_vertices());
    assert_eq!(again.num_faces(), first.num_faces());
    assert_relative_eq!(again.surface_area(), first.surface_area(), epsilon = 1e-9);
    assert_relative_eq!(again.volume(), first.volume(), epsilon = 1e-9);
}

#[test]
fn test_contains_point_matches_construction() {
    let points = testdata::random_box_points(200, 2.0, 5);
    let hull = get_convex_hull(&points).unwrap().unwrap();
    assert!(points.iter().all(|p| hull.contains_point(p)));
    assert!(!hull.contains_point(&Point3D::new(5.0, 0.0, 0.0)));
}

#[test]
fn test_degenerate_inputs() {
    assert!(matches!(
        get_convex_hull(&testdata::cube_vertices(1.0)[..3]),
        Err(ConvexHullError::InsufficientVertices(3))
    ));

    let flat: Vec<Point3D> = (0..20)
        .map(|i| Point3D::new(i as f64, (i * 7 % 5) as f64, 0.0))
        .collect();
    let err = get_convex_hull(&flat).unwrap_err();
    assert!(err.is_degenerate_input());

    let collinear: Vec<Point3D> = (0..6)
        .map(|i| Point3D::new(i as f64, i as f64, i as f64))
        .collect();
    assert!(matches!(
        ConvexHull3D::build(&collinear),
        Err(ConvexHullError::DegenerateConfiguration)
    ));
}

#[test]
fn test_mesh_json_round_trip() {
    let hull = get_convex_hull(&testdata::octahedron_vertices()).unwrap().unwrap();
    let json = serde_json::to_string(&hull.to_mesh()).unwrap();
    let mesh: HullMesh = serde_json::from_str(&json).unwrap();
    let back = ConvexHull3D::from_mesh(&mesh).unwrap();
    assert_eq!(back.num_faces(), 8);
    assert!(back.is_closed());
}
