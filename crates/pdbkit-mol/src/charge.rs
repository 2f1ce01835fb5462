//! PDB charge column helpers
//!
//! The fixed-column format renders formal charge as a two-character field
//! such as "2+" or "1-"; both readers and writers share these conversions.

/// Parse a PDB-style charge string (e.g. "2+", "1-", "+2", "+", "-")
pub fn parse_pdb_charge(charge_str: &str) -> i8 {
    let s = charge_str.trim();
    if s.is_empty() {
        return 0;
    }

    let chars: Vec<char> = s.chars().collect();

    match chars.as_slice() {
        ['+'] => 1,
        ['-'] => -1,
        [d, '+'] if d.is_ascii_digit() => d.to_digit(10).unwrap_or(0) as i8,
        [d, '-'] if d.is_ascii_digit() => -(d.to_digit(10).unwrap_or(0) as i8),
        ['+', d] if d.is_ascii_digit() => d.to_digit(10).unwrap_or(0) as i8,
        ['-', d] if d.is_ascii_digit() => -(d.to_digit(10).unwrap_or(0) as i8),
        _ => 0,
    }
}

/// Format a formal charge for the PDB two-character column ("2+", "1-", "  ")
pub fn format_pdb_charge(charge: i8) -> String {
    match charge {
        0 => "  ".to_string(),
        c if c > 0 => format!("{}+", c),
        c => format!("{}-", -c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_charge() {
        assert_eq!(parse_pdb_charge("2+"), 2);
        assert_eq!(parse_pdb_charge("2-"), -2);
        assert_eq!(parse_pdb_charge("+2"), 2);
        assert_eq!(parse_pdb_charge("-2"), -2);
        assert_eq!(parse_pdb_charge("+"), 1);
        assert_eq!(parse_pdb_charge("-"), -1);
        assert_eq!(parse_pdb_charge(""), 0);
        assert_eq!(parse_pdb_charge("  "), 0);
        assert_eq!(parse_pdb_charge("xx"), 0);
    }

    #[test]
    fn test_format_charge() {
        assert_eq!(format_pdb_charge(0), "  ");
        assert_eq!(format_pdb_charge(1), "1+");
        assert_eq!(format_pdb_charge(2), "2+");
        assert_eq!(format_pdb_charge(-1), "1-");
        assert_eq!(format_pdb_charge(-2), "2-");
    }

    #[test]
    fn test_roundtrip() {
        for c in -4i8..=4 {
            assert_eq!(parse_pdb_charge(&format_pdb_charge(c)), c);
        }
    }
}
