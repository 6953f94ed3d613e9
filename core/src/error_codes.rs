//! Stable error code constants embedded in error messages.
//!
//! Codes are part of the public contract: scripts grepping CLI output or
//! parsing JSON can key off them across releases.

pub const DIFF_SCHEMA_MISMATCH: &str = "TBLDIFF_DIFF_001";
pub const DIFF_KEY_NOT_FOUND: &str = "TBLDIFF_DIFF_002";

pub const CONTAINER_IO: &str = "TBLDIFF_CONT_001";
pub const CONTAINER_ZIP: &str = "TBLDIFF_CONT_002";
pub const CONTAINER_NOT_ZIP: &str = "TBLDIFF_CONT_003";
pub const CONTAINER_NOT_OPC: &str = "TBLDIFF_CONT_004";
pub const CONTAINER_TOO_MANY_ENTRIES: &str = "TBLDIFF_CONT_005";
pub const CONTAINER_PART_TOO_LARGE: &str = "TBLDIFF_CONT_006";
pub const CONTAINER_TOTAL_TOO_LARGE: &str = "TBLDIFF_CONT_007";
