//! Naming helpers for JVM-style binary class names.
//!
//! Binary names use `.` between packages and `$` between an outer class and
//! its nested classes (`android.app.AlertDialog$Builder`). The index keeps
//! binary names as class keys and uses the dotted display form
//! (`AlertDialog.Builder`) for short-name lookup.

/// Separator between an outer class and a nested class in binary names.
pub const NESTED_MARKER: char = '$';

/// Last `.`-separated segment of a name, `$` kept.
///
/// `android.app.AlertDialog$Builder` → `AlertDialog$Builder`
pub fn simple_name(fqn: &str) -> &str {
    fqn.rsplit_once('.').map_or(fqn, |(_, tail)| tail)
}

/// Short name used as a key in the name index.
///
/// `android.app.AlertDialog$Builder` → `AlertDialog.Builder`
pub fn short_name(fqn: &str) -> String {
    simple_name(fqn).replace(NESTED_MARKER, ".")
}

/// Whether the binary name denotes a nested class.
pub fn is_nested(fqn: &str) -> bool {
    simple_name(fqn).contains(NESTED_MARKER)
}

/// Anonymous or local classes compiled as `Outer$1`, `Outer$1Local`.
pub fn is_anonymous(fqn: &str) -> bool {
    simple_name(fqn)
        .split(NESTED_MARKER)
        .skip(1)
        .any(|part| part.starts_with(|c: char| c.is_ascii_digit()))
}

/// Type name with the package stripped, used for compact rendering.
///
/// `java.util.List<java.lang.String>` is not split on generic arguments;
/// callers simplify each type token separately.
pub fn unqualified(type_name: &str) -> &str {
    let tail = simple_name(type_name);
    tail.rsplit_once(NESTED_MARKER).map_or(tail, |(_, inner)| inner)
}
