//! Closest-point and intersection routines
//!
//! Every function here is pure. Degenerate configurations come back as
//! `None`, a "none" enum variant or an empty collection, never as an error.
//!
//! - [`line`]: lines, rays and segments
//! - [`plane`]: plane against line, ray, segment and plane
//! - [`circle`]: circle, cylinder and sphere against lines and points
//! - [`triangle`]: barycentric coordinates, rays, planes and other triangles

pub mod circle;
pub mod line;
pub mod plane;
pub mod triangle;

pub use circle::{
    Circle, CircleLineMode, ClosestPair, ClosestPoints, closest_point_circle_point,
    closest_point_sphere_point, closest_points_circle_line, closest_points_cylinder_line,
    closest_points_sphere_line,
};
pub use line::{
    closest_point_line_point, closest_point_ray_point, closest_point_segment_point,
    closest_points_line_line, closest_points_segment_segment, line_parameter,
};
pub use plane::{closest_point_plane_point, plane_line, plane_plane, plane_ray, plane_segment};
pub use triangle::{
    TriangleIntersection, closest_point_triangle_point, from_barycentric,
    is_inside_barycentric, is_on_edge_barycentric, ray_triangle, ray_triangles, to_barycentric,
    triangle_plane, triangle_triangle,
};
