//! Escape decoding applied to a pattern before it is parsed.
//!
//! `\uXXXX`, `\xXX`, octal `\0oo` / `\oo`, `\cX` and the `\0 \t \n \v \f \r`
//! shorthands become the characters they name. A decoded character that has a
//! meaning in patterns is written back escaped, so `\x28` stays a literal `(`.
//! The class `[\b]` becomes a backspace character.

const CONTROL: &str = "@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^ ?";
const SPECIAL: &str = "[]{}^$.|?*+()\\";

/// Decode the escapes in `pattern`. Unrecognised escapes are left untouched.
///
/// Example:
/// - `\x41\n` → `A` followed by a newline
/// - `\x28` → `\(`
pub fn decode(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i..].starts_with(&['[', '\\', 'b', ']']) {
            out.push('\u{8}');
            i += 4;
            continue;
        }
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        match decode_escape(&chars[i + 1..]) {
            Some((c, consumed)) => {
                if SPECIAL.contains(c) {
                    out.push('\\');
                }
                out.push(c);
                i += 1 + consumed;
            }
            None => {
                // Keep the escape pair intact so `\\n` is not read as `\n`.
                out.extend(&chars[i..(i + 2).min(chars.len())]);
                i += 2;
            }
        }
    }
    out
}

/// Decode the escape whose body (after the backslash) starts `rest`, returning
/// the character and how many characters of `rest` it used.
fn decode_escape(rest: &[char]) -> Option<(char, usize)> {
    let first = *rest.first()?;
    match first {
        'u' => hex(rest.get(1..5)?).map(|c| (c, 5)),
        'x' => hex(rest.get(1..3)?).map(|c| (c, 3)),
        'c' => {
            let code = CONTROL.chars().position(|c| Some(&c) == rest.get(1))?;
            char::from_u32(code as u32).map(|c| (c, 2))
        }
        '0'..='7' => octal(rest),
        't' => Some(('\t', 1)),
        'n' => Some(('\n', 1)),
        'v' => Some(('\u{b}', 1)),
        'f' => Some(('\u{c}', 1)),
        'r' => Some(('\r', 1)),
        _ => None,
    }
}

fn hex(digits: &[char]) -> Option<char> {
    if !digits.iter().all(char::is_ascii_hexdigit) {
        return None;
    }
    let text: String = digits.iter().collect();
    u32::from_str_radix(&text, 16).ok().and_then(char::from_u32)
}

/// `0oo`, `oo`, or a lone `0` (NUL).
fn octal(rest: &[char]) -> Option<(char, usize)> {
    let is_octal = |i: usize| rest.get(i).is_some_and(|c| ('0'..='7').contains(c));
    let len = if rest[0] == '0' && is_octal(1) && is_octal(2) {
        3
    } else if is_octal(0) && is_octal(1) {
        2
    } else if rest[0] == '0' {
        return Some(('\0', 1));
    } else {
        return None;
    };
    let text: String = rest[..len].iter().collect();
    u32::from_str_radix(&text, 8)
        .ok()
        .and_then(char::from_u32)
        .map(|c| (c, len))
}
