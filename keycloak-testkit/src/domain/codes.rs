/// Build a code guaranteed to differ from `valid_code`.
///
/// ASCII digits and letters are mirrored inside their range (`0`↔`9`,
/// `a`↔`z`, `A`↔`Z`, ...); every other character is kept. No character is
/// its own mirror, so any code holding at least one ASCII alphanumeric comes
/// back different, and mirroring twice gives the original back.
pub fn wrong_code(valid_code: &str) -> String {
    valid_code.chars().map(mirror).collect()
}

fn mirror(c: char) -> char {
    let (low, high) = match c {
        '0'..='9' => (b'0', b'9'),
        'a'..='z' => (b'a', b'z'),
        'A'..='Z' => (b'A', b'Z'),
        _ => return c,
    };
    char::from(low + high - c as u8)
}
