use entsync_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

/// Three-component position vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation between `self` and `other`, unclamped in
    /// value but with `t` clamped to [0, 1].
    pub fn lerp(&self, other: &Vec3, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        Vec3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

impl Serde for Vec3 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        self.x.ser(writer)?;
        self.y.ser(writer)?;
        self.z.ser(writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            x: f32::de(reader)?,
            y: f32::de(reader)?,
            z: f32::de(reader)?,
        })
    }
}

/// Unit quaternion rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    fn dot(&self, other: &Quat) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    fn normalized(self) -> Quat {
        let mag = self.dot(&self).sqrt();
        if mag <= f32::EPSILON {
            return Quat::IDENTITY;
        }
        Quat {
            x: self.x / mag,
            y: self.y / mag,
            z: self.z / mag,
            w: self.w / mag,
        }
    }

    /// Spherical interpolation between `self` and `other` with `t`
    /// clamped to [0, 1]. Falls back to normalized lerp when the
    /// rotations are nearly parallel.
    pub fn slerp(&self, other: &Quat, t: f32) -> Quat {
        let t = t.clamp(0.0, 1.0);

        let mut cos_theta = self.dot(other);
        // Take the short way around
        let mut end = *other;
        if cos_theta < 0.0 {
            cos_theta = -cos_theta;
            end = Quat::new(-other.x, -other.y, -other.z, -other.w);
        }

        if cos_theta > 0.9995 {
            return Quat {
                x: self.x + (end.x - self.x) * t,
                y: self.y + (end.y - self.y) * t,
                z: self.z + (end.z - self.z) * t,
                w: self.w + (end.w - self.w) * t,
            }
            .normalized();
        }

        let theta = cos_theta.clamp(-1.0, 1.0).acos();
        let sin_theta = theta.sin();
        let scale_a = ((1.0 - t) * theta).sin() / sin_theta;
        let scale_b = (t * theta).sin() / sin_theta;

        Quat {
            x: self.x * scale_a + end.x * scale_b,
            y: self.y * scale_a + end.y * scale_b,
            z: self.z * scale_a + end.z * scale_b,
            w: self.w * scale_a + end.w * scale_b,
        }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Serde for Quat {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        self.x.ser(writer)?;
        self.y.ser(writer)?;
        self.z.ser(writer)?;
        self.w.ser(writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            x: f32::de(reader)?,
            y: f32::de(reader)?,
            z: f32::de(reader)?,
            w: f32::de(reader)?,
        })
    }
}

/// A renderable position + rotation pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

/// Where `value` sits between `a` and `b`, as a fraction in [0, 1].
/// Returns 0.0 when `a` and `b` coincide.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}
