use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A point or extent in world space.
///
/// `y` is the vertical axis. Blocks only ever move and get sliced along the
/// horizontal axes `x` and `z`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Unit vector pointing toward the positive side of `axis`.
    #[must_use]
    pub const fn unit(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::new(1.0, 0.0, 0.0),
            Axis::Z => Self::new(0.0, 0.0, 1.0),
        }
    }

    #[must_use]
    pub const fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Z => self.z,
        }
    }

    pub const fn set(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Z => self.z = value,
        }
    }

    #[must_use]
    pub const fn with(mut self, axis: Axis, value: f32) -> Self {
        self.set(axis, value);
        self
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for Vec3 {
    type Err = GeometryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);
        let mut next = || -> Result<f32, GeometryParseError> {
            let part = parts
                .next()
                .ok_or_else(|| GeometryParseError::new(s, "expected 3 comma-separated values"))?;
            part.parse()
                .map_err(|_| GeometryParseError::new(s, "invalid number"))
        };
        let v = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(GeometryParseError::new(s, "expected 3 comma-separated values"));
        }
        Ok(v)
    }
}

/// Horizontal axis along which a block can travel and be sliced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[display("x")]
    X,
    #[display("z")]
    Z,
}

impl Axis {
    /// Both horizontal axes in processing order.
    pub const ALL: [Self; 2] = [Self::X, Self::Z];

    const fn bit(self) -> u8 {
        match self {
            Self::X => 0b01,
            Self::Z => 0b10,
        }
    }
}

/// Subset of the horizontal axes.
///
/// Iteration always yields `X` before `Z`, which fixes the order in which the
/// alignment algorithm emits falling pieces.
///
/// Serialized as a compact string: `"x"`, `"z"`, `"xz"` or `""`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AxisSet(u8);

impl AxisSet {
    pub const EMPTY: Self = Self(0);
    pub const X: Self = Self(Axis::X.bit());
    pub const Z: Self = Self(Axis::Z.bit());
    pub const XZ: Self = Self(Axis::X.bit() | Axis::Z.bit());

    #[must_use]
    pub const fn single(axis: Axis) -> Self {
        Self(axis.bit())
    }

    /// Enables every horizontal axis whose component in `direction` is nonzero.
    ///
    /// The vertical component is ignored.
    ///
    /// ```
    /// use towerstack_engine::{AxisSet, Vec3};
    ///
    /// assert_eq!(AxisSet::from_direction(Vec3::new(1.0, 0.0, 0.0)), AxisSet::X);
    /// assert_eq!(AxisSet::from_direction(Vec3::new(-0.5, 3.0, 0.5)), AxisSet::XZ);
    /// ```
    #[must_use]
    pub fn from_direction(direction: Vec3) -> Self {
        Axis::ALL
            .into_iter()
            .filter(|axis| direction.get(*axis) != 0.0)
            .fold(Self::EMPTY, Self::with)
    }

    #[must_use]
    pub const fn with(self, axis: Axis) -> Self {
        Self(self.0 | axis.bit())
    }

    #[must_use]
    pub const fn contains(self, axis: Axis) -> bool {
        self.0 & axis.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Axis> {
        Axis::ALL.into_iter().filter(move |axis| self.contains(*axis))
    }
}

impl fmt::Debug for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in self.iter() {
            write!(f, "{axis}")?;
        }
        Ok(())
    }
}

impl FromStr for AxisSet {
    type Err = GeometryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars().try_fold(Self::EMPTY, |set, c| {
            let axis = match c.to_ascii_lowercase() {
                'x' => Axis::X,
                'z' => Axis::Z,
                _ => return Err(GeometryParseError::new(s, "axes must be 'x' and/or 'z'")),
            };
            if set.contains(axis) {
                return Err(GeometryParseError::new(s, "duplicate axis"));
            }
            Ok(set.with(axis))
        })
    }
}

impl Serialize for AxisSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AxisSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Axis-aligned box: center position and full size on each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect3 {
    pub center: Vec3,
    pub size: Vec3,
}

impl Rect3 {
    #[must_use]
    pub const fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    /// Lowest coordinate covered along `axis`.
    #[must_use]
    pub fn min(&self, axis: Axis) -> f32 {
        self.center.get(axis) - self.size.get(axis) / 2.0
    }

    /// Highest coordinate covered along `axis`.
    #[must_use]
    pub fn max(&self, axis: Axis) -> f32 {
        self.center.get(axis) + self.size.get(axis) / 2.0
    }
}

/// Formats as `x,y,z:sx,sy,sz`.
impl fmt::Display for Rect3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.center, self.size)
    }
}

impl FromStr for Rect3 {
    type Err = GeometryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (center, size) = s
            .split_once(':')
            .ok_or_else(|| GeometryParseError::new(s, "expected format 'x,y,z:sx,sy,sz'"))?;
        Ok(Self::new(center.parse()?, size.parse()?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cannot parse '{input}': {reason}")]
pub struct GeometryParseError {
    input: String,
    reason: &'static str,
}

impl GeometryParseError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_owned(),
            reason,
        }
    }
}
