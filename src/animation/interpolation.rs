// Rotation helpers matching the engine's own math

use nalgebra_glm as glm;

/// Builds a quaternion from (roll, pitch, yaw) radians, applied as
/// yaw * pitch * roll.
pub fn angle_quaternion(angles: &glm::Vec3) -> glm::Quat {
    let (sy, cy) = (angles.z * 0.5).sin_cos();
    let (sp, cp) = (angles.y * 0.5).sin_cos();
    let (sr, cr) = (angles.x * 0.5).sin_cos();

    glm::quat(
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy,
    )
}

/// Spherical interpolation that takes the short way round and falls back to
/// a perpendicular path when the inputs are opposite.
pub fn quaternion_slerp(p: &glm::Quat, q: &glm::Quat, t: f32) -> glm::Quat {
    let p = [p.i, p.j, p.k, p.w];
    let mut q = [q.i, q.j, q.k, q.w];

    let mut a = 0.0;
    let mut b = 0.0;
    for i in 0..4 {
        a += (p[i] - q[i]) * (p[i] - q[i]);
        b += (p[i] + q[i]) * (p[i] + q[i]);
    }
    if a > b {
        q = q.map(|c| -c);
    }

    let cosom: f32 = (0..4).map(|i| p[i] * q[i]).sum();
    let mut out = [0.0f32; 4];

    if 1.0 + cosom > 1e-6 {
        let (sclp, sclq) = if 1.0 - cosom > 1e-6 {
            let omega = cosom.acos();
            let sinom = omega.sin();
            (
                ((1.0 - t) * omega).sin() / sinom,
                (t * omega).sin() / sinom,
            )
        } else {
            (1.0 - t, t)
        };
        for i in 0..4 {
            out[i] = sclp * p[i] + sclq * q[i];
        }
    } else {
        let perpendicular = [-p[1], p[0], -p[3], p[2]];
        let half_pi = std::f32::consts::FRAC_PI_2;
        let sclp = ((1.0 - t) * half_pi).sin();
        let sclq = (t * half_pi).sin();
        for i in 0..3 {
            out[i] = sclp * p[i] + sclq * perpendicular[i];
        }
        out[3] = perpendicular[3];
    }

    glm::quat(out[0], out[1], out[2], out[3])
}

/// Rotation matrix of a unit quaternion. No normalization is applied.
pub fn quaternion_matrix(q: &glm::Quat) -> glm::Mat3 {
    let (x, y, z, w) = (q.i, q.j, q.k, q.w);

    // glm::mat3 takes its arguments row by row
    glm::mat3(
        1.0 - 2.0 * y * y - 2.0 * z * z,
        2.0 * x * y - 2.0 * w * z,
        2.0 * x * z + 2.0 * w * y,
        2.0 * x * y + 2.0 * w * z,
        1.0 - 2.0 * x * x - 2.0 * z * z,
        2.0 * y * z - 2.0 * w * x,
        2.0 * x * z - 2.0 * w * y,
        2.0 * y * z + 2.0 * w * x,
        1.0 - 2.0 * x * x - 2.0 * y * y,
    )
}

pub fn lerp_vec3(a: &glm::Vec3, b: &glm::Vec3, t: f32) -> glm::Vec3 {
    a * (1.0 - t) + b * t
}
