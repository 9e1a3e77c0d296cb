//! Adversarial training of a fully-connected GAN on MNIST digits with Burn.
//!
//! The [`training`] module drives the alternating optimization loop, the
//! [`model`] module holds the two networks and their losses, [`data`] turns
//! raw MNIST items into normalized batches, and [`utils`] renders the sample
//! grids and the final loss curve.

pub mod data;
pub mod model;
pub mod training;
pub mod utils;
