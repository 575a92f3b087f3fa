#![cfg_attr(not(test), no_std)]

pub mod measurement;
pub mod series_point;
pub mod wire;

pub use measurement::Measurement;
pub use series_point::{SeriesPoint, DEFAULT_SERIES_CAPACITY};
pub use wire::{encode, encode_with, EncodedLine, LineFormat};
