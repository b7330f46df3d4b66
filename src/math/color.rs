use crate::math::Vector4;

/// A RGBA `Color`. Each color component is a floating point value
/// with a range from 0 to 1.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Returns a new `Color` with every component clamped into `[0, 1]`.
    pub fn clip(&self) -> Self {
        let clamp = |v: f32| v.max(0.0).min(1.0);
        Color::new(clamp(self.r), clamp(self.g), clamp(self.b), clamp(self.a))
    }

    #[inline]
    pub fn rgba(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn rgb(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub const fn white() -> Self {
        Color::new(1.0, 1.0, 1.0, 1.0)
    }

    #[inline]
    pub const fn black() -> Self {
        Color::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn yellow() -> Self {
        Color::new(1.0, 1.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn transparent() -> Self {
        Color::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl From<[f32; 4]> for Color {
    fn from(v: [f32; 4]) -> Self {
        Color::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        c.rgba()
    }
}

impl From<Color> for Vector4<f32> {
    fn from(c: Color) -> Self {
        Vector4::new(c.r, c.g, c.b, c.a)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clip() {
        let c = Color::new(1.5, -0.2, 0.5, 1.0).clip();
        assert_eq!(c, Color::new(1.0, 0.0, 0.5, 1.0));
    }

    #[test]
    fn convert() {
        let v: [f32; 4] = Color::yellow().into();
        assert_eq!(v, [1.0, 1.0, 0.0, 1.0]);
        assert_eq!(Color::from(v), Color::yellow());
    }
}
