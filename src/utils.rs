/// copy the leading `N` bytes of a slice into an array, zero filling if the slice is short
pub(crate) fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut arr = [0; N];
    bytes
        .iter()
        .take(N)
        .enumerate()
        .for_each(|(idx, value)| arr[idx] = *value);
    arr
}

/// format a float the way it is written into header attributes
pub(crate) fn format_float(value: f64) -> String {
    let mut buffer = ryu::Buffer::new();
    buffer.format(value).to_string()
}

/// round a non-negative ratio `numerator / denominator` to the nearest integer, ties upward
pub(crate) fn round_div(numerator: usize, denominator: usize) -> usize {
    (2 * numerator + denominator) / (2 * denominator)
}

#[test]
fn round_div_ties_upward() {
    assert_eq!(round_div(4, 2), 2);
    assert_eq!(round_div(5, 2), 3);
    assert_eq!(round_div(4, 3), 1);
    assert_eq!(round_div(5, 3), 2);
    assert_eq!(round_div(0, 7), 0);
}

#[test]
fn floats_are_shortest_roundtrip() {
    assert_eq!(format_float(0.0025), "0.0025");
    assert_eq!(format_float(1.0), "1.0");
}
