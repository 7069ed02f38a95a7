#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scale(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::Vec2;

    #[test]
    fn add_sub_scale() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(-0.5, 4.0);
        assert_eq!(a + b, Vec2::new(0.5, 6.0));
        assert_eq!(a - b, Vec2::new(1.5, -2.0));
        assert_eq!(a.scale(2.0), Vec2::new(2.0, 4.0));
    }
}
