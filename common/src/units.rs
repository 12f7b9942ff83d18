//! Memory unit grammar: a leading integer followed by one of `K`, `M`, `G`
//! (case-insensitive), interpreted as powers of 1024. An empty string
//! parses to 0. A unit absent from the table defaults to a multiplier of 1.

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

pub fn parse_memory(value: &str) -> u64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let (digits, multiplier) = match trimmed.chars().last() {
        Some(c) if c.eq_ignore_ascii_case(&'k') => (&trimmed[..trimmed.len() - 1], KIB),
        Some(c) if c.eq_ignore_ascii_case(&'m') => (&trimmed[..trimmed.len() - 1], MIB),
        Some(c) if c.eq_ignore_ascii_case(&'g') => (&trimmed[..trimmed.len() - 1], GIB),
        _ => (trimmed, 1),
    };

    digits.trim().parse::<u64>().unwrap_or(0) * multiplier
}

/// Renders `bytes` as `⌊bytes / 2^20⌋` followed by the literal suffix `M`.
pub fn bytes_to_mb(bytes: u64) -> String {
    format!("{}M", bytes / MIB)
}
