pub const FULL_VERSION: &str = concat!("flies-ann ", env!("CARGO_PKG_VERSION"));

pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nFLiES-ANN shortwave radiation table processor",
    "\nneural network surrogate of the Forest Light Environmental Simulator"
);
