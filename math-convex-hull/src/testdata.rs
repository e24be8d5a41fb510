//! Point clouds for hull, Voronoi and refinement tests and benches

use math_geometry::Point3D;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random points near a sphere (radius varies by ±10%)
pub fn random_sphere_points(n: usize, radius: f64) -> Vec<Point3D> {
    random_sphere_points_seeded(n, radius, rand::rng().random())
}

/// Reproducible variant of [`random_sphere_points`]
pub fn random_sphere_points_seeded(n: usize, radius: f64, seed: u64) -> Vec<Point3D> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let azimuth = rng.random::<f64>() * 2.0 * std::f64::consts::PI;
            let elevation = (rng.random::<f64>() * 2.0 - 1.0).asin();
            let r = radius * (0.9 + 0.2 * rng.random::<f64>());
            Point3D::from_spherical(azimuth, elevation, r)
        })
        .collect()
}

/// Uniformly distributed points on a sphere using a Fibonacci lattice
pub fn fibonacci_sphere_points(n: usize, radius: f64) -> Vec<Point3D> {
    let golden_ratio = (1.0 + 5.0_f64.sqrt()) / 2.0;

    (0..n)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * (i as f64) / golden_ratio;
            let phi = ((2 * i + 1) as f64 / n as f64 - 1.0).acos();
            Point3D::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            )
        })
        .collect()
}

/// Points uniformly inside an axis-aligned box centered on the origin
pub fn random_box_points(n: usize, size: f64, seed: u64) -> Vec<Point3D> {
    let mut rng = StdRng::seed_from_u64(seed);
    let s = size / 2.0;
    (0..n)
        .map(|_| {
            Point3D::new(
                rng.random_range(-s..s),
                rng.random_range(-s..s),
                rng.random_range(-s..s),
            )
        })
        .collect()
}

/// A cube's corners, centered on the origin
pub fn cube_vertices(size: f64) -> Vec<Point3D> {
    let s = size / 2.0;
    vec![
        Point3D::new(-s, -s, -s),
        Point3D::new(s, -s, -s),
        Point3D::new(s, s, -s),
        Point3D::new(-s, s, -s),
        Point3D::new(-s, -s, s),
        Point3D::new(s, -s, s),
        Point3D::new(s, s, s),
        Point3D::new(-s, s, s),
    ]
}

/// Cube corners plus random points strictly inside the cube
pub fn cube_with_interior_points(size: f64, n_interior: usize) -> Vec<Point3D> {
    let mut vertices = cube_vertices(size);
    let mut rng = rand::rng();
    let s = size / 2.0 * 0.999;

    for _ in 0..n_interior {
        vertices.push(Point3D::new(
            rng.random_range(-s..s),
            rng.random_range(-s..s),
            rng.random_range(-s..s),
        ));
    }

    vertices
}

/// Regular tetrahedron with unit edges
pub fn tetrahedron_vertices() -> Vec<Point3D> {
    vec![
        Point3D::new(0.0, 0.0, 0.0),
        Point3D::new(1.0, 0.0, 0.0),
        Point3D::new(0.5, (3.0_f64).sqrt() / 2.0, 0.0),
        Point3D::new(0.5, (3.0_f64).sqrt() / 6.0, (2.0 / 3.0_f64).sqrt()),
    ]
}

/// Regular icosahedron
pub fn icosahedron_vertices() -> Vec<Point3D> {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0; // Golden ratio

    vec![
        Point3D::new(-1.0, phi, 0.0),
        Point3D::new(1.0, phi, 0.0),
        Point3D::new(-1.0, -phi, 0.0),
        Point3D::new(1.0, -phi, 0.0),
        Point3D::new(0.0, -1.0, phi),
        Point3D::new(0.0, 1.0, phi),
        Point3D::new(0.0, -1.0, -phi),
        Point3D::new(0.0, 1.0, -phi),
        Point3D::new(phi, 0.0, -1.0),
        Point3D::new(phi, 0.0, 1.0),
        Point3D::new(-phi, 0.0, -1.0),
        Point3D::new(-phi, 0.0, 1.0),
    ]
}

/// Regular octahedron
pub fn octahedron_vertices() -> Vec<Point3D> {
    vec![
        Point3D::new(1.0, 0.0, 0.0),
        Point3D::new(-1.0, 0.0, 0.0),
        Point3D::new(0.0, 1.0, 0.0),
        Point3D::new(0.0, -1.0, 0.0),
        Point3D::new(0.0, 0.0, 1.0),
        Point3D::new(0.0, 0.0, -1.0),
    ]
}
