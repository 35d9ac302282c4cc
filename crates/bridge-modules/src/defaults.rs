//! Default constants for descriptor construction.

/// First id handed out by a fresh module registry.
pub const FIRST_MODULE_ID: u64 = 1;

/// Legacy vendor prefixes stripped from module names, in match priority.
pub const VENDOR_PREFIXES: [&str; 2] = ["RCT", "RK"];
