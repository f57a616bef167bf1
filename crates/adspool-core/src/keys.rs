//! Stable parameter names and fallback values.
//!
//! External configuration sources must use these key names verbatim.

/// Server host name or address. Required.
pub const HOST: &str = "HOST";

/// Server port. Optional, taken from the loaded defaults (typically `6262`).
pub const SOCKET: &str = "SOCKET";

/// Path of the data dictionary (`.add` file) or free-table directory. Required.
///
/// Tenant and directory scoped connections append a suffix to this value.
pub const DATABASE_DICTIONARY: &str = "DATABASE_DICTIONARY";

/// Locking mode: `proprietary` or `compatible`.
pub const LOCK_TYPE: &str = "LOCK_TYPE";

/// Character data type: `ansi`, `oem`, or a collation name.
pub const CHAR_TYPE: &str = "CHAR_TYPE";

/// Table type: `adt`, `vfp`, `cdx` or `ntx`.
pub const TABLE_TYPE: &str = "TABLE_TYPE";

/// The keys filled from defaults when a config leaves them out.
pub const DEFAULTED_KEYS: [&str; 4] = [SOCKET, LOCK_TYPE, CHAR_TYPE, TABLE_TYPE];

pub const DEFAULT_LOCK_TYPE: &str = "proprietary";
pub const DEFAULT_CHAR_TYPE: &str = "ansi";
pub const DEFAULT_TABLE_TYPE: &str = "adt";

/// Maximum concurrent connections per pool.
pub const POOL_SIZE: u32 = 8;

/// Probe issued to validate a borrowed connection. The driver has no native
/// liveness check.
pub const LIVENESS_QUERY: &str = "SELECT 1 FROM system.iota";

/// Scheme prepended to a canonical key to form the driver address.
pub const ADDRESS_SCHEME: &str = "jdbc:extendedsystems:advantage://";
