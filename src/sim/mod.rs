//! Physics-based sensor source / actuator sink standing in for the real
//! simulator, per §1's "any real or simulated sensor source implementing
//! the reader interface is acceptable". Grounded on
//! `original_source/src/simulation/*.py`.

pub mod dynamics;
pub mod noise;
pub mod source;

pub use source::SimSource;
