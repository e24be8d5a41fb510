//! Export functions for hulls and triangle batches

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use math_geometry::{IndexedTriangle, Vector3D, same_arena};

use crate::types::ConvexHull3D;
use crate::{ConvexHullError, Result};

/// Export a convex hull to OBJ format
///
/// The OBJ format is a simple text format for 3D models.
/// It includes vertices (v), normals (vn), and faces (f).
pub fn export_obj<P: AsRef<Path>>(hull: &ConvexHull3D, path: P) -> Result<()> {
    export_triangles_obj(hull.triangles(), path)
}

/// Export any triangle batch sharing one arena to OBJ format
///
/// Every arena point is written, so face indices match the arena.
pub fn export_triangles_obj<P: AsRef<Path>>(triangles: &[IndexedTriangle], path: P) -> Result<()> {
    let arena = same_arena(triangles)?
        .ok_or_else(|| ConvexHullError::InvalidFace("nothing to export".to_string()))?;
    let mut file = BufWriter::new(File::create(path)?);

    // Write header
    writeln!(file, "# Triangle mesh OBJ Export")?;
    writeln!(file, "# Vertices: {}", arena.len())?;
    writeln!(file, "# Faces: {}", triangles.len())?;
    writeln!(file)?;

    for p in arena.iter() {
        writeln!(file, "v {} {} {}", p.x, p.y, p.z)?;
    }
    writeln!(file)?;

    for t in triangles {
        let n = t.normal_unit().unwrap_or_else(Vector3D::zero);
        writeln!(file, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    writeln!(file)?;

    // OBJ uses 1-based indexing
    for (i, t) in triangles.iter().enumerate() {
        let [a, b, c] = t.indices();
        writeln!(
            file,
            "f {}//{} {}//{} {}//{}",
            a + 1,
            i + 1,
            b + 1,
            i + 1,
            c + 1,
            i + 1
        )?;
    }

    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use math_geometry::Point3D;
    use std::fs;

    #[test]
    fn test_export_counts_lines() {
        let tris = IndexedTriangle::batch(
            vec![
                Point3D::new(0.0, 0.0, 0.0),
                Point3D::new(1.0, 0.0, 0.0),
                Point3D::new(0.0, 1.0, 0.0),
                Point3D::new(0.0, 0.0, 1.0),
            ],
            &[[0, 2, 1], [0, 1, 3]],
        );
        let path = std::env::temp_dir().join(format!("hull_export_{}.obj", std::process::id()));
        export_triangles_obj(&tris, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 2);
        assert!(text.contains("f 1//1 3//1 2//1"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_export_empty_batch_fails() {
        let path = std::env::temp_dir().join("hull_export_empty.obj");
        assert!(matches!(
            export_triangles_obj(&[], &path),
            Err(ConvexHullError::InvalidFace(_))
        ));
    }
}
