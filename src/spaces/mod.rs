/// Sampling spaces for factor values and task reset distributions.

pub mod interop;
pub mod space;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

pub use space::Space;

/// A discrete space of integers in [start, start + n).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discrete {
    start: u32,
    n: u32,
}

impl Discrete {
    pub fn new(n: u32) -> Self { Self::with_start(0, n) }

    pub fn with_start(start: u32, n: u32) -> Self {
        assert!(n > 0, "Discrete space requires n > 0");
        assert!(start.checked_add(n).is_some(), "Discrete space overflows u32");
        Self { start, n }
    }

    pub fn n(&self) -> u32 { self.n }
    pub fn start(&self) -> u32 { self.start }
}

impl Space for Discrete {
    type Element = u32;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        if self.n == 1 { return self.start; }
        let dist = Uniform::from(self.start..self.start + self.n);
        dist.sample(rng)
    }

    fn contains(&self, elem: &Self::Element) -> bool {
        *elem >= self.start && *elem - self.start < self.n
    }
}

/// A Box space with element type `T` and fixed compile-time length `N`.
/// Uses per-dimension inclusive lower/upper bounds for validation and sampling.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxSpace<T: Copy + PartialOrd, const N: usize> {
    low: [T; N],
    high: [T; N],
}

impl<T: Copy + PartialOrd, const N: usize> BoxSpace<T, N> {
    pub fn new(low: [T; N], high: [T; N]) -> Self {
        for i in 0..N {
            assert!(low[i] <= high[i], "low[{i}] > high[{i}]");
        }
        Self { low, high }
    }

    /// Fallible constructor for bounds that come from user configuration.
    pub fn try_new(low: [T; N], high: [T; N]) -> crate::core::Result<Self> {
        for i in 0..N {
            // written as a negation so NaN bounds are rejected too
            if !(low[i] <= high[i]) {
                return Err(crate::core::GymError::InvalidArgument(format!(
                    "BoxSpace bound {i}: low > high"
                )));
            }
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> &[T; N] { &self.low }
    pub fn high(&self) -> &[T; N] { &self.high }
}

impl<T, const N: usize> Space for BoxSpace<T, N>
where
    T: Copy + PartialOrd + rand::distributions::uniform::SampleUniform,
{
    type Element = [T; N];

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Element {
        // Each dimension independently from Uniform[low, high]
        let mut arr = self.low;
        for i in 0..N {
            let dist = Uniform::new_inclusive(self.low[i], self.high[i]);
            arr[i] = dist.sample(rng);
        }
        arr
    }

    fn contains(&self, elem: &Self::Element) -> bool {
        (0..N).all(|i| self.low[i] <= elem[i] && elem[i] <= self.high[i])
    }
}
