use glam::{Mat4, Vec3};

use crate::ScreenConfig;

const FOV_DEGREES: f32 = 90.;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.;
const SPIN_DEGREES_PER_SEC: f32 = 50.;

/// Fixed view/projection pair plus the time-parameterized model matrix.
#[derive(Debug, Clone)]
pub struct FrameTransform {
    view: Mat4,
    projection: Mat4,
}
impl FrameTransform {
    pub fn new(screen: ScreenConfig) -> Self {
        let projection = Mat4::perspective_rh_gl(
            FOV_DEGREES.to_radians(),
            screen.aspect_ratio(),
            NEAR_PLANE,
            FAR_PLANE,
        );
        let view = Mat4::from_translation(Vec3::new(0., 0., -3.));
        Self { view, projection }
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Model matrix at `time` seconds since launch. Pure: equal inputs give
    /// identical matrices.
    ///
    /// The rotation axis is not normalized, so the effective spin rate is
    /// coupled to the axis length. The z translation uses `tan`, which blows
    /// up near `pi/2 + k*pi` and makes the cube snap periodically. Both
    /// quirks are load-bearing for the observed motion and are kept as is.
    pub fn model(&self, time: f32) -> Mat4 {
        let angle = (time * SPIN_DEGREES_PER_SEC).to_radians();
        let axis = Vec3::new((time * 2.).sin(), (time * 3.).sin(), time.cos());
        let translation = Vec3::new(
            time.sin(),
            ((time * 3.).sin() + 1.) / 2. * 0.5,
            time.tan() + 1.,
        );
        // Translation is post-multiplied: it moves the cube in its rotated
        // local frame.
        rotate(axis, angle) * Mat4::from_translation(translation)
    }
}

/// Axis-angle rotation matrix. Unlike `Mat4::from_axis_angle`, the axis is
/// used as given and may be of any length.
pub fn rotate(axis: Vec3, angle: f32) -> Mat4 {
    let (sin, cos) = angle.sin_cos();
    let cos_com = 1. - cos;
    let (x, y, z) = (axis.x, axis.y, axis.z);
    Mat4::from_cols_array(&[
        // col
        cos + x * x * cos_com,
        x * y * cos_com + z * sin,
        x * z * cos_com - y * sin,
        0.,
        // col
        x * y * cos_com - z * sin,
        cos + y * y * cos_com,
        y * z * cos_com + x * sin,
        0.,
        // col
        x * z * cos_com + y * sin,
        y * z * cos_com - x * sin,
        cos + z * z * cos_com,
        0.,
        // col
        0.,
        0.,
        0.,
        1.,
    ])
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn test_model_at_zero_is_translation() {
        let transform = FrameTransform::new(ScreenConfig::default());
        let expected = Mat4::from_translation(Vec3::new(0., 0.25, 1.));
        assert!(transform.model(0.).abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_model_deterministic() {
        let transform = FrameTransform::new(ScreenConfig::default());
        assert_eq!(transform.model(1.234), transform.model(1.234));
    }

    #[test]
    fn test_rotate_zero_angle_is_identity() {
        let m = rotate(Vec3::new(3., -7., 0.5), 0.);
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_rotate_quarter_turn_about_z() {
        let m = rotate(Vec3::Z, FRAC_PI_2);
        let p = m.transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_fixed_matrices() {
        let transform = FrameTransform::new(ScreenConfig::default());
        let view = Mat4::from_translation(Vec3::new(0., 0., -3.));
        assert_eq!(transform.view(), view);
        let projection =
            Mat4::perspective_rh_gl(FRAC_PI_2, 1920. / 1080., 0.1, 100.);
        assert!(transform.projection().abs_diff_eq(projection, 1e-6));
    }
}
