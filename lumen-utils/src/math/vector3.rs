use std::ops::{Add, Sub};

/// A three component vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vector3<T> {
    /// The x component.
    pub x: T,
    /// The y component.
    pub y: T,
    /// The z component.
    pub z: T,
}

impl<T> Vector3<T> {
    /// Creates a new vector.
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl Vector3<i32> {
    /// Sum of the absolute component values.
    #[must_use]
    pub const fn manhattan_length(self) -> i32 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }
}

impl<T: Add<Output = T>> Add for Vector3<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Sub<Output = T>> Sub for Vector3<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_length() {
        assert_eq!(Vector3::new(3, -2, 1).manhattan_length(), 6);
        assert_eq!(Vector3::new(0, 0, 0).manhattan_length(), 0);
    }

    #[test]
    fn test_sub() {
        let a = Vector3::new(5, 6, 7);
        let b = Vector3::new(1, 2, 3);
        assert_eq!(a - b, Vector3::new(4, 4, 4));
    }
}
