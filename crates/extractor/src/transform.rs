//! Local-to-world placement of chunk vertices.

use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

/// Parses `x,y,z`.
impl FromStr for Vec3 {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(format!("expected x,y,z, got '{input}'"));
        };
        let parse = |s: &str| {
            s.parse::<f32>()
                .map_err(|_| format!("invalid coordinate '{s}'"))
        };
        Ok(Self::new(parse(x)?, parse(y)?, parse(z)?))
    }
}

/// Maps a chunk-local point into world space given the composed offset of
/// the chunk and its parents.
pub trait WorldTransform {
    fn transform(&self, point: Vec3, world_offset: Vec3) -> Vec3;
}

impl<F> WorldTransform for F
where
    F: Fn(Vec3, Vec3) -> Vec3,
{
    fn transform(&self, point: Vec3, world_offset: Vec3) -> Vec3 {
        self(point, world_offset)
    }
}

/// Plain translation by the world offset.
#[derive(Clone, Copy, Debug, Default)]
pub struct Translation;

impl WorldTransform for Translation {
    fn transform(&self, point: Vec3, world_offset: Vec3) -> Vec3 {
        point.add(world_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation() {
        let moved = Translation.transform(Vec3::new(1.0, 2.0, 3.0), Vec3::new(10.0, -2.0, 0.5));
        assert_eq!(moved, Vec3::new(11.0, 0.0, 3.5));
    }

    #[test]
    fn test_closure_transform() {
        let swap = |p: Vec3, _offset: Vec3| Vec3::new(p.z, p.x, p.y);
        assert_eq!(
            swap.transform(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO),
            Vec3::new(3.0, 1.0, 2.0)
        );
    }

    #[test]
    fn test_parse_vec3() {
        assert_eq!("1, -2.5,3".parse::<Vec3>().unwrap(), Vec3::new(1.0, -2.5, 3.0));
        assert!("1,2".parse::<Vec3>().is_err());
        assert!("1,2,x".parse::<Vec3>().is_err());
    }

    #[test]
    fn test_deserialize_from_array() {
        let v: Vec3 = serde_json::from_str("[0.5, 1, -1]").unwrap();
        assert_eq!(v, Vec3::new(0.5, 1.0, -1.0));
    }
}
