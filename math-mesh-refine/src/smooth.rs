//! Curved edge splitting for smooth slicing

use math_geometry::{Point3D, Vector3D, best_fit_plane};

use crate::slice::EdgeSplitter;

/// Splits each edge at the middle of a cubic Bezier curve
///
/// The curve runs from `A` to `B`. Its inner control points start at one
/// third and two thirds of the chord and are then projected onto the tangent
/// planes of `A` and `B`. A vertex's tangent plane is the best-fit plane of
/// every point in the triangles around it, facing the same way as those
/// triangles.
#[derive(Debug, Clone)]
pub(crate) struct BezierMidpoints {
    normals: Vec<Option<Vector3D>>,
}

impl BezierMidpoints {
    pub fn new(points: &[Point3D], faces: &[[usize; 3]]) -> Self {
        let mut ring: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
        let mut facing = vec![Vector3D::zero(); points.len()];
        for face in faces {
            let [a, b, c] = face.map(|i| points[i]);
            let n = (b - a).cross(&(c - a));
            for &v in face {
                ring[v].extend_from_slice(face);
                facing[v] += n;
            }
        }

        let normals = (0..points.len())
            .map(|v| {
                let facing = facing[v].normalize()?;
                let mut around = ring[v].clone();
                around.sort_unstable();
                around.dedup();
                let cloud: Vec<Point3D> = around.iter().map(|&i| points[i]).collect();
                let fitted = best_fit_plane(&cloud).map_or(facing, |fit| fit.normal);
                Some(if fitted.dot(&facing) < 0.0 { -fitted } else { fitted })
            })
            .collect();
        Self { normals }
    }

    fn normal(&self, index: usize) -> Option<Vector3D> {
        self.normals.get(index).copied().flatten()
    }

    /// Project `p` onto the tangent plane at `origin`
    fn onto_tangent(p: Point3D, origin: Point3D, normal: Option<Vector3D>) -> Point3D {
        match normal {
            Some(n) => p - n * (p - origin).dot(&n),
            None => p,
        }
    }
}

impl EdgeSplitter for BezierMidpoints {
    fn split(&mut self, points: &[Point3D], a: usize, b: usize) -> Point3D {
        let (pa, pb) = (points[a], points[b]);
        let (na, nb) = (self.normal(a), self.normal(b));
        let chord = pb - pa;
        let c1 = Self::onto_tangent(pa + chord / 3.0, pa, na);
        let c2 = Self::onto_tangent(pb - chord / 3.0, pb, nb);

        // B(1/2) = (A + 3 c1 + 3 c2 + B) / 8
        let sum = pa.to_vector() + c1.to_vector() * 3.0 + c2.to_vector() * 3.0 + pb.to_vector();
        let mid = Point3D::origin() + sum / 8.0;

        let normal = match (na, nb) {
            (Some(x), Some(y)) => (x + y).normalize().or(Some(x)),
            (x, y) => x.or(y),
        };
        debug_assert_eq!(self.normals.len(), points.len());
        self.normals.push(normal);
        mid
    }
}
