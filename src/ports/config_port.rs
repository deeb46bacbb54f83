//! Configuration access port trait.

/// Typed reads of `[section] key` values.
///
/// The numeric and boolean getters return `default` both when the key is
/// absent and when its value does not parse; callers that must reject a bad
/// value read it with `get_string` and parse it themselves.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
