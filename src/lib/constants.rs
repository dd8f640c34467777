/// Solar constant used by the FLiES partitioning [W/m2]
pub const SOLAR_CONSTANT: f64 = 1333.6;

/// Amplitude of the Earth-Sun distance correction [-]
pub const ECCENTRICITY_AMPLITUDE: f64 = 0.033;

/// Days in the year used by the solar geometry
pub const DAYS_IN_YEAR: f64 = 365.0;

/// Coordinates are matched at this resolution when joining service records [°]
pub const COORDINATE_RESOLUTION: f64 = 1e-6;

// aerosol types
pub const ATYPE_CONTINENTAL: i32 = 1;
pub const ATYPE_DESERT: i32 = 2;

// cloud types
pub const CTYPE_CLEAR: i32 = 0;
pub const CTYPE_STRATUS: i32 = 1;
pub const CTYPE_CUMULUS: i32 = 2;
