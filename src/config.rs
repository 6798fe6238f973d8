//! Diff behavior knobs

/// Default relative tolerance for float comparison
pub const DEFAULT_REL_TOLERANCE: f64 = 1e-5;
/// Default absolute tolerance for float comparison
pub const DEFAULT_ABS_TOLERANCE: f64 = 1e-8;

/// Options for a snapshot comparison
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Relative tolerance for float columns
    pub rel_tolerance: f64,
    /// Absolute tolerance for float columns
    pub abs_tolerance: f64,
    /// Skip the duplicate-key check; matching then degrades to last-wins
    /// per key and classification for duplicated keys is undefined
    pub allow_duplicate_keys: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            rel_tolerance: DEFAULT_REL_TOLERANCE,
            abs_tolerance: DEFAULT_ABS_TOLERANCE,
            allow_duplicate_keys: false,
        }
    }
}

impl DiffOptions {
    pub fn with_rel_tolerance(mut self, rtol: f64) -> Self {
        self.rel_tolerance = rtol;
        self
    }

    pub fn with_abs_tolerance(mut self, atol: f64) -> Self {
        self.abs_tolerance = atol;
        self
    }

    pub fn with_allow_duplicate_keys(mut self, allow: bool) -> Self {
        self.allow_duplicate_keys = allow;
        self
    }
}
