pub mod rng;

pub use rng::{DEFAULT_SEED, RngStream, SeedSequence, labelled_rng, rng_from_seed};
