// Utility Functions
// Job and document name normalization helpers

use std::fs;
use std::path::Path;

/// Strip a conventional suffix (e.g. `.inp`) from a job name.
///
/// Returns the name unchanged when it does not carry the suffix.
pub fn strip_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return name;
    }
    name.strip_suffix(suffix).unwrap_or(name)
}

/// Toggle a conventional suffix: remove it when present, append it otherwise.
///
/// Run tables are inconsistent about whether job names carry the input
/// suffix, so lookups try both spellings.
pub fn toggle_suffix(name: &str, suffix: &str) -> String {
    match name.strip_suffix(suffix) {
        Some(stem) if !suffix.is_empty() => stem.to_string(),
        _ => format!("{}{}", name, suffix),
    }
}

/// Trim a document name and append `.{extension}` when it is missing
pub fn ensure_extension(name: &str, extension: &str) -> String {
    let name = name.trim();
    let dotted = format!(".{}", extension);
    if name.ends_with(&dotted) {
        name.to_string()
    } else {
        format!("{}{}", name, dotted)
    }
}

/// Format `value` with a fixed number of decimals, never writing `-0`.
///
/// Exact halfway values round away from zero (`0.03125` to 4 places is
/// `0.0313`); everything else rounds to the nearest representation.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    if is_decimal_tie(value, decimals) {
        return round_tie_away(value, decimals);
    }
    let formatted = format!("{:.*}", decimals, value);
    match formatted.strip_prefix('-') {
        Some(unsigned) if unsigned.chars().all(|c| c == '0' || c == '.') => unsigned.to_string(),
        _ => formatted,
    }
}

/// Whether `value` sits exactly halfway between two multiples of `10^-decimals`.
///
/// With `value = m * 2^e` and `m` odd, `value * 2 * 10^d = m * 5^d * 2^(e + d + 1)`
/// is an odd integer only when `e == -(d + 1)`.
fn is_decimal_tie(value: f64, decimals: usize) -> bool {
    if !value.is_finite() || value == 0.0 {
        return false;
    }
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    exponent + i64::from(mantissa.trailing_zeros()) == -(decimals as i64 + 1)
}

/// Round a tie away from zero by bumping the last kept digit
fn round_tie_away(value: f64, decimals: usize) -> String {
    // A tie terminates at decimals + 1 places, so this expansion is exact
    let mut digits = format!("{:.*}", decimals + 1, value.abs()).into_bytes();
    digits.pop();
    if decimals == 0 {
        digits.pop(); // '.'
    }

    let mut carry = true;
    for digit in digits.iter_mut().rev() {
        match *digit {
            b'.' => continue,
            b'9' => *digit = b'0',
            _ => {
                *digit += 1;
                carry = false;
                break;
            }
        }
    }
    if carry {
        digits.insert(0, b'1');
    }

    let unsigned = String::from_utf8_lossy(&digits).into_owned();
    if value < 0.0 {
        format!("-{}", unsigned)
    } else {
        unsigned
    }
}

/// Find the file stem of the first file in `dir` with the given extension.
///
/// Entries are sorted by name so the choice is stable across platforms.
/// Returns `None` if the directory cannot be read or holds no such file.
pub fn first_stem_with_extension(dir: &Path, extension: &str) -> Option<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(extension))
        .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
        .collect();
    names.sort();
    names.into_iter().next()
}

/// List file names in `dir` with the given extension, sorted
pub fn list_with_extension(dir: &Path, extension: &str) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(extension))
        .filter_map(|path| path.file_name().and_then(|s| s.to_str()).map(String::from))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix("rolling_1.inp", ".inp"), "rolling_1");
        assert_eq!(strip_suffix("rolling_1", ".inp"), "rolling_1");
        assert_eq!(strip_suffix("rolling_1.inp", ""), "rolling_1.inp");
    }

    #[test]
    fn test_toggle_suffix() {
        assert_eq!(toggle_suffix("rolling_1.inp", ".inp"), "rolling_1");
        assert_eq!(toggle_suffix("rolling_1", ".inp"), "rolling_1.inp");
    }

    #[test]
    fn test_ensure_extension() {
        assert_eq!(ensure_extension(" lateral ", "tdx"), "lateral.tdx");
        assert_eq!(ensure_extension("lateral.tdx", "tdx"), "lateral.tdx");
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(206842.776, 0), "206843");
        assert_eq!(format_fixed(0.08726646, 4), "0.0873");
        assert_eq!(format_fixed(-0.00001, 4), "0.0000");
        assert_eq!(format_fixed(-1.5, 2), "-1.50");
    }

    #[test]
    fn test_format_fixed_ties_round_away_from_zero() {
        assert_eq!(format_fixed(0.03125, 4), "0.0313");
        assert_eq!(format_fixed(-0.03125, 4), "-0.0313");
        assert_eq!(format_fixed(2.5, 0), "3");
        assert_eq!(format_fixed(0.5, 0), "1");
        assert_eq!(format_fixed(9.5, 0), "10");
        assert_eq!(format_fixed(0.125, 2), "0.13");
        assert_eq!(format_fixed(99.875, 2), "99.88");
        assert_eq!(format_fixed(9.9375, 3), "9.938");
        assert_eq!(format_fixed(0.5, 8), "0.50000000");
        // 1.005 is stored just below the halfway point
        assert_eq!(format_fixed(1.005, 2), "1.00");
    }

    #[test]
    fn test_first_stem_with_extension() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("b_run.odb"), "").unwrap();
        fs::write(temp.path().join("a_run.odb"), "").unwrap();
        fs::write(temp.path().join("a_run.inp"), "").unwrap();

        assert_eq!(
            first_stem_with_extension(temp.path(), "odb"),
            Some("a_run".to_string())
        );
        assert_eq!(first_stem_with_extension(temp.path(), "sta"), None);
    }

    #[test]
    fn test_first_stem_missing_dir() {
        assert!(first_stem_with_extension(Path::new("/nonexistent/dir"), "odb").is_none());
    }

    #[test]
    fn test_list_with_extension() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("lateral.tdx"), "").unwrap();
        fs::write(temp.path().join("cornering.tdx"), "").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();

        assert_eq!(
            list_with_extension(temp.path(), "tdx"),
            vec!["cornering.tdx".to_string(), "lateral.tdx".to_string()]
        );
    }
}
