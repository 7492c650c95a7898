use lazy_static::lazy_static;
use std::sync::RwLock;

/// Constant indicating that an inequality bound is to be treated as
/// infinite.   Bounds of this size or larger are capped internally.
pub const DEFAULT_INFINITY: f64 = 1e20;

lazy_static! {
    static ref INFINITY: RwLock<f64> = RwLock::new(DEFAULT_INFINITY);
}

/// Configure the solver's internal bound for treating values as infinite.
pub fn set_infinity(v: f64) {
    let mut infinity = INFINITY.write().unwrap();
    *infinity = v;
}

/// The solver's current internal infinity bound.
pub fn get_infinity() -> f64 {
    *INFINITY.read().unwrap()
}

/// Restore the solver's internal infinity bound to its default.
pub fn default_infinity() {
    set_infinity(DEFAULT_INFINITY);
}
