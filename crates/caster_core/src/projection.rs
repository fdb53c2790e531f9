//! Wireframe view/projection transform for preview displays.
//!
//! Maps world-space polylines into a camera-space frame where +x is
//! the view depth axis and +z is up, applies a perspective scaled by
//! the screen distance, and performs the homogeneous divide. Polylines
//! with any vertex behind the camera plane are dropped whole.

use caster_math::{Mat4, Vec3, Vec4};

/// Camera frame for wireframe projection.
#[derive(Debug, Copy, Clone)]
pub struct ViewFrame {
    pub camera_position: Vec3,
    pub view_direction: Vec3,
    pub up: Vec3,
    pub screen_distance: f32,
}

impl ViewFrame {
    /// Combined view/projection matrix for this frame.
    pub fn matrix(&self) -> Mat4 {
        let view = self.view_direction.normalize();
        let up = self.up.normalize();
        let right = view.cross(up).normalize();

        // Rows are the camera basis: depth, right, up.
        let rotation = Mat4::from_cols(
            Vec4::new(view.x, right.x, up.x, 0.0),
            Vec4::new(view.y, right.y, up.y, 0.0),
            Vec4::new(view.z, right.z, up.z, 0.0),
            Vec4::W,
        );
        let translation = Mat4::from_translation(-self.camera_position);

        let d = self.screen_distance;
        let perspective = Mat4::from_cols(
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, d, 0.0, 0.0),
            Vec4::new(0.0, 0.0, d, 0.0),
            Vec4::W,
        );

        perspective * rotation * translation
    }

    /// Project a single point; `None` when it lies behind the camera
    /// plane.
    pub fn project_point(&self, point: Vec3) -> Option<Vec3> {
        project_with(&self.matrix(), point)
    }

    /// Project wireframe polylines, dropping any line with a vertex
    /// behind the camera plane.
    pub fn project_lines(&self, lines: &[Vec<Vec3>]) -> Vec<Vec<Vec3>> {
        let matrix = self.matrix();
        lines
            .iter()
            .filter_map(|line| {
                line.iter()
                    .map(|&p| project_with(&matrix, p))
                    .collect::<Option<Vec<Vec3>>>()
            })
            .collect()
    }
}

fn project_with(matrix: &Mat4, point: Vec3) -> Option<Vec3> {
    let v = *matrix * point.extend(1.0);
    if v.x < 0.0 {
        return None;
    }
    Some(Vec3::new(v.x / v.w, v.y / v.w, v.z / v.w))
}
