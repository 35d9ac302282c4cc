//! Module name normalization

use crate::defaults::VENDOR_PREFIXES;

/// Map a raw module name to its public name.
///
/// Strips the first matching legacy vendor prefix (`RCT` before `RK`) and
/// returns the rest untouched. Names without a known prefix pass through.
pub fn normalize(raw: &str) -> &str {
    VENDOR_PREFIXES
        .iter()
        .find_map(|prefix| raw.strip_prefix(prefix))
        .unwrap_or(raw)
}
