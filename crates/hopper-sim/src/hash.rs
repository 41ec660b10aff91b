//! Canonical BLAKE3 hashing of simulation state.
//!
//! Values are fed as fixed-width little-endian bytes (floats by bit pattern),
//! so two states hash equal exactly when they are bit-for-bit equal. NaN
//! payloads and signed zeros are therefore distinguished.

use hopper_physics::prelude::*;

use crate::tick::InputFrame;

pub(crate) struct StateHasher(blake3::Hasher);

impl StateHasher {
    pub(crate) fn new(domain: &str) -> Self {
        let mut hasher = Self(blake3::Hasher::new());
        hasher.str(domain);
        hasher
    }

    pub(crate) fn u64(&mut self, value: u64) -> &mut Self {
        self.0.update(&value.to_le_bytes());
        self
    }

    pub(crate) fn f64(&mut self, value: f64) -> &mut Self {
        self.u64(value.to_bits())
    }

    pub(crate) fn bool(&mut self, value: bool) -> &mut Self {
        self.0.update(&[value as u8]);
        self
    }

    /// Length-prefixed so adjacent strings cannot alias.
    pub(crate) fn str(&mut self, value: &str) -> &mut Self {
        self.u64(value.len() as u64);
        self.0.update(value.as_bytes());
        self
    }

    pub(crate) fn opt_u64(&mut self, value: Option<u64>) -> &mut Self {
        match value {
            Some(v) => self.bool(true).u64(v),
            None => self.bool(false),
        }
    }

    pub(crate) fn rect(&mut self, rect: &impl Rect) -> &mut Self {
        self.f64(rect.x())
            .f64(rect.y())
            .f64(rect.width())
            .f64(rect.height())
    }

    pub(crate) fn body(&mut self, body: &Body) -> &mut Self {
        self.rect(body)
            .f64(body.vx)
            .f64(body.vy)
            .bool(body.on_ground)
    }

    pub(crate) fn input(&mut self, input: &InputFrame) -> &mut Self {
        let direction = match input.direction {
            Direction::Left => 0u8,
            Direction::None => 1,
            Direction::Right => 2,
        };
        self.0.update(&[direction]);
        self.bool(input.jump)
    }

    /// 64 lowercase hex characters.
    pub(crate) fn finish(&self) -> String {
        self.0.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_64_hex_chars() {
        let h = StateHasher::new("test").u64(1).finish();
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signed_zero_is_distinguished() {
        let a = StateHasher::new("test").f64(0.0).finish();
        let b = StateHasher::new("test").f64(-0.0).finish();
        assert_ne!(a, b);
    }

    #[test]
    fn domain_separates_digests() {
        let a = StateHasher::new("a").u64(7).finish();
        let b = StateHasher::new("b").u64(7).finish();
        assert_ne!(a, b);
    }

    #[test]
    fn strings_are_length_prefixed() {
        let a = StateHasher::new("t").str("ab").str("c").finish();
        let b = StateHasher::new("t").str("a").str("bc").finish();
        assert_ne!(a, b);
    }
}
