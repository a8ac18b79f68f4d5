use nalgebra::Vector3;

pub const N_XYZ_COORDINATES: usize = 3;

/// Angular rate about the three device axes, in rad/s.
#[derive(Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct XYZ(Vector3<f64>);

impl XYZ {
    pub fn new(data: [f64; N_XYZ_COORDINATES]) -> Self {
        Self(Vector3::from(data))
    }

    pub fn from_vector(data: Vector3<f64>) -> Self {
        Self(data)
    }

    pub fn inner(&self) -> [f64; N_XYZ_COORDINATES] {
        [self.0.x, self.0.y, self.0.z]
    }

    /// Rate about the pitch axis.
    pub fn x(&self) -> f64 {
        self.0.x
    }

    /// Rate about the roll axis.
    pub fn y(&self) -> f64 {
        self.0.y
    }

    /// Rate about the yaw axis.
    pub fn z(&self) -> f64 {
        self.0.z
    }
}

impl From<XYZ> for [f64; N_XYZ_COORDINATES] {
    fn from(value: XYZ) -> Self {
        value.inner()
    }
}

impl From<[f64; N_XYZ_COORDINATES]> for XYZ {
    fn from(value: [f64; N_XYZ_COORDINATES]) -> Self {
        Self(Vector3::from(value))
    }
}

impl From<XYZ> for Vec<f64> {
    fn from(value: XYZ) -> Self {
        value.inner().to_vec()
    }
}

impl TryFrom<Vec<f64>> for XYZ {
    type Error = &'static str;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        if value.len() != N_XYZ_COORDINATES {
            return Err("Can't convert to XYZ");
        }
        Ok(Self(Vector3::from_vec(value)))
    }
}
