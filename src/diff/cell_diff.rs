//! Cell-level comparison: null-aware, tolerance-aware equality

use crate::config::DiffOptions;
use crate::model::CellValue;

/// Compares cells under the diff tolerance settings
pub struct CellComparator {
    rel_tolerance: f64,
    abs_tolerance: f64,
}

impl CellComparator {
    pub fn new(options: &DiffOptions) -> Self {
        Self {
            rel_tolerance: options.rel_tolerance,
            abs_tolerance: options.abs_tolerance,
        }
    }

    /// True when the two cells count as a change.
    ///
    /// Both-null is never a change; null against anything concrete always is.
    /// Float values (or int against float) are compared within
    /// `|a - b| <= atol + rtol * |b|`; everything else is exact.
    pub fn differs(&self, old: &CellValue, new: &CellValue) -> bool {
        match (old, new) {
            (CellValue::Null, CellValue::Null) => false,
            (CellValue::Null, _) | (_, CellValue::Null) => true,
            (CellValue::Float(_), _) | (_, CellValue::Float(_)) => {
                match (old.as_f64(), new.as_f64()) {
                    (Some(a), Some(b)) => !self.is_close(a, b),
                    _ => old != new,
                }
            }
            _ => old != new,
        }
    }

    fn is_close(&self, a: f64, b: f64) -> bool {
        if a.is_nan() && b.is_nan() {
            return true;
        }
        if a.is_infinite() || b.is_infinite() {
            return a == b;
        }
        (a - b).abs() <= self.abs_tolerance + self.rel_tolerance * b.abs()
    }
}

impl Default for CellComparator {
    fn default() -> Self {
        Self::new(&DiffOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_equality_for_non_floats() {
        let cmp = CellComparator::default();
        assert!(!cmp.differs(&CellValue::Int(42), &CellValue::Int(42)));
        assert!(cmp.differs(&CellValue::Int(42), &CellValue::Int(43)));
        assert!(!cmp.differs(&"a".into(), &"a".into()));
        assert!(cmp.differs(&"a".into(), &"b".into()));
    }

    #[test]
    fn floats_within_tolerance_do_not_differ() {
        let cmp = CellComparator::default();
        assert!(!cmp.differs(&CellValue::Float(1.0), &CellValue::Float(1.000_000_1)));
        assert!(cmp.differs(&CellValue::Float(1.0), &CellValue::Float(1.1)));
    }

    #[test]
    fn absolute_tolerance_near_zero() {
        let cmp = CellComparator::default();
        assert!(!cmp.differs(&CellValue::Float(0.0), &CellValue::Float(1e-9)));
        assert!(cmp.differs(&CellValue::Float(0.0), &CellValue::Float(1e-6)));
    }

    #[test]
    fn int_against_float_uses_tolerance() {
        let cmp = CellComparator::default();
        assert!(!cmp.differs(&CellValue::Int(10), &CellValue::Float(10.000_05)));
        assert!(cmp.differs(&CellValue::Int(10), &CellValue::Float(10.5)));
    }

    #[test]
    fn null_handling() {
        let cmp = CellComparator::default();
        assert!(!cmp.differs(&CellValue::Null, &CellValue::Null));
        assert!(cmp.differs(&CellValue::Null, &CellValue::Float(1.0)));
        assert!(cmp.differs(&CellValue::Float(1.0), &CellValue::Null));
    }

    #[test]
    fn nan_on_both_sides_is_not_a_change() {
        let cmp = CellComparator::default();
        assert!(!cmp.differs(&CellValue::Float(f64::NAN), &CellValue::Float(f64::NAN)));
        assert!(cmp.differs(&CellValue::Float(f64::NAN), &CellValue::Float(1.0)));
    }

    #[test]
    fn custom_tolerance() {
        let opts = DiffOptions::default()
            .with_rel_tolerance(0.0)
            .with_abs_tolerance(0.5);
        let cmp = CellComparator::new(&opts);
        assert!(!cmp.differs(&CellValue::Float(1.0), &CellValue::Float(1.4)));
        assert!(cmp.differs(&CellValue::Float(1.0), &CellValue::Float(1.6)));
    }
}
