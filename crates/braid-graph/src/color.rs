//! Deterministic node colors
//!
//! A checkpoint's color is a pure function of its text so the same
//! checkpoint keeps its color across rebuilds and processes. The seed is a
//! 128-bit avalanche hash of the UTF-16 code units; the stream comes from a
//! 32-bit small-fast-counter generator.

use rand::Rng;
use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};

/// An RGB color, rendered as `rgb(r, g, b)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Create color from components
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Four 32-bit seed words from a string
///
/// Order sensitive: every code unit is folded into all four accumulators,
/// and a final cross-mixing round spreads a single-character change over
/// every output word.
#[must_use]
pub fn seed_words(input: &str) -> [u32; 4] {
    let mut h1: u32 = 1_779_033_703;
    let mut h2: u32 = 3_144_134_277;
    let mut h3: u32 = 1_013_904_242;
    let mut h4: u32 = 2_773_480_762;

    for unit in input.encode_utf16() {
        let k = u32::from(unit);
        h1 = h2 ^ (h1 ^ k).wrapping_mul(597_399_067);
        h2 = h3 ^ (h2 ^ k).wrapping_mul(2_869_860_233);
        h3 = h4 ^ (h3 ^ k).wrapping_mul(951_274_213);
        h4 = h1 ^ (h4 ^ k).wrapping_mul(2_716_044_179);
    }

    h1 = (h3 ^ (h1 >> 18)).wrapping_mul(597_399_067);
    h2 = (h4 ^ (h2 >> 22)).wrapping_mul(2_869_860_233);
    h3 = (h1 ^ (h3 >> 17)).wrapping_mul(951_274_213);
    h4 = (h2 ^ (h4 >> 19)).wrapping_mul(2_716_044_179);

    h1 ^= h2 ^ h3 ^ h4;
    h2 ^= h1;
    h3 ^= h1;
    h4 ^= h1;
    [h1, h2, h3, h4]
}

/// 32-bit small fast counting generator
#[derive(Debug, Clone)]
pub struct Sfc32 {
    a: u32,
    b: u32,
    c: u32,
    d: u32,
}

impl Sfc32 {
    /// Create generator from four seed words
    #[inline]
    #[must_use]
    pub const fn new(seed: [u32; 4]) -> Self {
        Self {
            a: seed[0],
            b: seed[1],
            c: seed[2],
            d: seed[3],
        }
    }

    /// Create generator seeded from a string
    #[inline]
    #[must_use]
    pub fn from_text(input: &str) -> Self {
        Self::new(seed_words(input))
    }

    /// Next raw 32-bit output
    pub fn next_u32(&mut self) -> u32 {
        let t = self.a.wrapping_add(self.b);
        self.a = self.b ^ (self.b >> 9);
        self.b = self.c.wrapping_add(self.c << 3);
        self.c = self.c.rotate_left(21);
        self.d = self.d.wrapping_add(1);
        let t = t.wrapping_add(self.d);
        self.c = self.c.wrapping_add(t);
        t
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Next value scaled to `[0, 256)` and floored
    pub fn next_channel(&mut self) -> u8 {
        // floor(v * 256) for v = t / 2^32 is the top byte of t
        self.next_u32().to_be_bytes()[0]
    }
}

/// Stable color for a piece of text
///
/// Empty or absent text has nothing to key on and falls back to the
/// thread RNG, so that color changes between calls.
#[must_use]
pub fn color_for(text: Option<&str>) -> Rgb {
    match text {
        Some(text) if !text.is_empty() => {
            let mut rng = Sfc32::from_text(text);
            let r = rng.next_channel();
            let g = rng.next_channel();
            let b = rng.next_channel();
            Rgb::new(r, g, b)
        }
        _ => {
            let mut rng = rand::rng();
            Rgb::new(rng.random(), rng.random(), rng.random())
        }
    }
}
