pub mod centroid;

pub use centroid::{centroid_of, estimate_centroid, to_lat_lon};
