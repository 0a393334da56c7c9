//! Linear congruential generator used as keystream source.

/// Multiplier of the generator, the same one used by the MSVC `rand()`
pub const DEFAULT_MULTIPLIER: i32 = 214013;

/// Increment of the generator
pub const DEFAULT_INCREMENT: i32 = 2531011;

/// Deterministic 15 bit pseudo random sequence over a 32 bit signed state.
///
/// ```
/// use anno_rda::lcg::Lcg;
///
/// let mut lcg = Lcg::new(0);
/// assert_eq!(lcg.next(), Some(38));
/// assert_eq!(lcg.current(), 38);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg {
    state: i32,
    multiplier: i32,
    increment: i32,
}

impl Lcg {
    /// Creates a generator with the default multiplier and increment
    pub const fn new(seed: i32) -> Self {
        Self::with_parameters(seed, DEFAULT_MULTIPLIER, DEFAULT_INCREMENT)
    }

    pub const fn with_parameters(seed: i32, multiplier: i32, increment: i32) -> Self {
        Self {
            state: seed,
            multiplier,
            increment,
        }
    }

    /// Projection of the current state without advancing it
    pub const fn current(&self) -> u16 {
        ((self.state >> 16) & 0x7FFF) as u16
    }

    /// Advances the state and returns the new projection
    pub fn advance(&mut self) -> u16 {
        self.state = self
            .state
            .wrapping_mul(self.multiplier)
            .wrapping_add(self.increment);
        self.current()
    }
}

/// Never ends; take as many words as needed.
impl Iterator for Lcg {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        Some(self.advance())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Lcg;
    use crate::cipher::SEED;

    #[test]
    fn golden_sequence_for_format_seed() {
        let actual = Lcg::new(SEED).take(5).collect::<Vec<_>>();
        assert_eq!(actual, vec![0x3841, 0x73CC, 0x644A, 0x7A60, 0x4E9B]);
    }

    #[test]
    fn current_does_not_advance() {
        let mut lcg = Lcg::new(SEED);
        assert_eq!(lcg.current(), 0x000A);

        let first = lcg.advance();
        assert_eq!(lcg.current(), first);
        assert_eq!(lcg.current(), first);
        assert_eq!(lcg.advance(), 0x73CC);
    }

    #[test]
    fn values_stay_within_15_bits() {
        assert!(Lcg::new(-1).take(10_000).all(|v| v <= 0x7FFF));
    }

    #[test]
    fn custom_parameters() {
        let mut lcg = Lcg::with_parameters(1, 1, 0x10000);
        assert_eq!(lcg.advance(), 1);
        assert_eq!(lcg.advance(), 2);
    }
}
