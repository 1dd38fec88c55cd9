//! Domain layer (architecture gate placeholder).
//
// This crate currently provides a shared compute abstraction used by multiple
// subsystems. The presence of this module satisfies the workspace architectural
// gate that expects qc-* crates to have a hexagonal layout.
