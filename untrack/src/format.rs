/// Render `n` with its decimal digits grouped from the right.
///
/// `group_digits(1_000_000, 3, ',') == "1,000,000"`. A `group_size` of zero
/// disables grouping.
pub fn group_digits(n: u64, group_size: usize, separator: char) -> String {
    let digits = n.to_string();
    if group_size == 0 || digits.len() <= group_size {
        return digits;
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / group_size);
    // Width of the leading, possibly short, group.
    let head = match digits.len() % group_size {
        0 => group_size,
        rem => rem,
    };
    for (i, ch) in digits.chars().enumerate() {
        if i >= head && (i - head) % group_size == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Whole KiB (1024 bytes) needed to hold `bytes`, rounded up.
pub fn kib_count(bytes: u64) -> u64 {
    bytes.div_ceil(1024)
}

/// [`kib_count`] with `,` separators. This is the number shown before the
/// `KB` label in listings.
pub fn kib(bytes: u64) -> String {
    group_digits(kib_count(bytes), 3, ',')
}
