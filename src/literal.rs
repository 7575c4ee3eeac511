//! Minimal literal spellings
//!
//! Numbers pick the shortest of their decimal, hexadecimal or exponent forms; strings and
//! bytes try every quote style, plain and raw. Every candidate is decoded back and only
//! kept when it reproduces the exact value.

use num_bigint::BigInt;
use num_traits::Signed;

use crate::tree::Literal;

// ═══════════════════════════════════════════════════════════════════════════════
// QUOTES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    Single,
    Double,
    TripleSingle,
    TripleDouble,
}

impl Quote {
    pub const ALL: [Quote; 4] = [
        Quote::Single,
        Quote::Double,
        Quote::TripleSingle,
        Quote::TripleDouble,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Quote::Single => "'",
            Quote::Double => "\"",
            Quote::TripleSingle => "'''",
            Quote::TripleDouble => "\"\"\"",
        }
    }

    pub fn char(self) -> char {
        match self {
            Quote::Single | Quote::TripleSingle => '\'',
            Quote::Double | Quote::TripleDouble => '"',
        }
    }

    pub fn is_triple(self) -> bool {
        matches!(self, Quote::TripleSingle | Quote::TripleDouble)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NUMBERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Shortest spelling of a non-negative integer: decimal or `0x` hexadecimal.
pub fn int_text(value: &BigInt) -> String {
    if value.is_negative() {
        return format!("-{}", int_text(&-value));
    }
    let decimal = value.to_string();
    let hex = format!("0x{}", value.to_str_radix(16));
    if hex.len() < decimal.len()
        && BigInt::parse_bytes(hex[2..].as_bytes(), 16).as_ref() == Some(value)
    {
        hex
    } else {
        decimal
    }
}

/// Shortest-round-trip digits and power-of-ten scale: `value == digits * 10^scale`.
fn decompose(value: f64) -> (String, i32) {
    let sci = format!("{:e}", value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => (sci.as_str(), "0"),
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let fraction_digits = mantissa.split_once('.').map(|(_, f)| f.len()).unwrap_or(0) as i32;
    (digits, exponent - fraction_digits)
}

/// Candidate spellings for a finite, non-negative float. `integral_ok` admits a bare digit
/// string, which is only valid in front of the `j` of an imaginary literal.
fn float_candidates(value: f64, integral_ok: bool) -> Vec<String> {
    let (digits, scale) = decompose(value);
    let mut out = Vec::new();
    if scale >= 0 {
        let whole = format!("{}{}", digits, "0".repeat(scale as usize));
        if integral_ok {
            out.push(whole.clone());
        }
        out.push(format!("{}.", whole));
    } else {
        let point = digits.len() as i32 + scale;
        if point > 0 {
            let (head, tail) = digits.split_at(point as usize);
            out.push(format!("{}.{}", head, tail));
        } else {
            out.push(format!(".{}{}", "0".repeat((-point) as usize), digits));
        }
    }
    if scale != 0 {
        out.push(format!("{}e{}", digits, scale));
    } else {
        out.push(format!("{}e0", digits));
    }
    out
}

fn shortest_verified(candidates: Vec<String>, value: f64) -> Option<String> {
    let mut candidates = candidates;
    candidates.sort_by_key(|c| c.len());
    candidates
        .into_iter()
        .find(|c| c.parse::<f64>().map(|v| v.to_bits() == value.to_bits()).unwrap_or(false))
}

pub fn float_text(value: f64) -> String {
    if value.is_nan() {
        unreachable!("NaN has no literal form");
    }
    if value.is_sign_negative() {
        return format!("-{}", float_text(-value));
    }
    if value.is_infinite() {
        return "1e999".to_string();
    }
    shortest_verified(float_candidates(value, false), value)
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Spelling of an imaginary literal, including the trailing `j`.
pub fn complex_text(imag: f64) -> String {
    if imag.is_nan() {
        unreachable!("NaN has no literal form");
    }
    if imag.is_sign_negative() {
        return format!("-{}", complex_text(-imag));
    }
    if imag.is_infinite() {
        return "1e999j".to_string();
    }
    let body = shortest_verified(float_candidates(imag, true), imag)
        .unwrap_or_else(|| format!("{:?}", imag));
    format!("{}j", body)
}

// ═══════════════════════════════════════════════════════════════════════════════
// STRINGS
// ═══════════════════════════════════════════════════════════════════════════════

fn needs_escape(c: char) -> bool {
    (c < ' ' && c != '\t' && c != '\n')
        || c == '\x7f'
        || ('\u{80}'..='\u{9f}').contains(&c)
        || c == '\u{2028}'
        || c == '\u{2029}'
}

fn push_escaped(out: &mut String, c: char, next: Option<char>) {
    match c {
        '\x07' => out.push_str("\\a"),
        '\x08' => out.push_str("\\b"),
        '\x0b' => out.push_str("\\v"),
        '\x0c' => out.push_str("\\f"),
        '\r' => out.push_str("\\r"),
        '\n' => out.push_str("\\n"),
        '\0' if !matches!(next, Some('0'..='7')) => out.push_str("\\0"),
        c if (c as u32) <= 0xff => out.push_str(&format!("\\x{:02x}", c as u32)),
        c if (c as u32) <= 0xffff => out.push_str(&format!("\\u{:04x}", c as u32)),
        c => out.push_str(&format!("\\U{:08x}", c as u32)),
    }
}

/// Whether the quote character at `index` must be escaped to keep the literal open.
fn quote_needs_escape(chars: &[char], index: usize, quote: Quote) -> bool {
    let q = quote.char();
    if !quote.is_triple() {
        return true;
    }
    index + 1 == chars.len() || (chars.get(index + 1) == Some(&q) && chars.get(index + 2) == Some(&q))
}

/// Encode text between the quotes of a string literal. `None` when the quote/raw
/// combination can't represent the value.
pub fn encode_str_body(value: &str, quote: Quote, raw: bool, ascii_only: bool) -> Option<String> {
    let chars: Vec<char> = value.chars().collect();
    let q = quote.char();
    let mut out = String::with_capacity(value.len() + 2);

    if raw {
        if chars.last() == Some(&'\\') {
            return None;
        }
        for (i, &c) in chars.iter().enumerate() {
            if c == q && quote_needs_escape(&chars, i, quote) {
                return None;
            }
            if c == '\\' && chars.get(i + 1) == Some(&q) {
                return None;
            }
            if c == '\n' && !quote.is_triple() {
                return None;
            }
            if needs_escape(c) || (ascii_only && !c.is_ascii()) {
                return None;
            }
            out.push(c);
        }
        return Some(out);
    }

    for (i, &c) in chars.iter().enumerate() {
        let next = chars.get(i + 1).copied();
        if c == '\\' {
            out.push_str("\\\\");
        } else if c == q {
            if quote_needs_escape(&chars, i, quote) {
                out.push('\\');
            }
            out.push(c);
        } else if c == '\n' {
            if quote.is_triple() {
                out.push('\n');
            } else {
                out.push_str("\\n");
            }
        } else if needs_escape(c) || (ascii_only && !c.is_ascii()) {
            push_escaped(&mut out, c, next);
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Encode the body of a bytes literal. Non-ASCII bytes always take `\x` escapes.
pub fn encode_bytes_body(value: &[u8], quote: Quote, raw: bool) -> Option<String> {
    let text: String = value.iter().map(|&b| b as char).collect();
    if raw && value.iter().any(|&b| b >= 0x80) {
        return None;
    }
    encode_str_body(&text, quote, raw, true)
}

fn hex_value(digits: &[char]) -> Option<u32> {
    let text: String = digits.iter().collect();
    u32::from_str_radix(&text, 16).ok()
}

/// Decode a complete literal body the way the tokenizer would. Returns `None` when the
/// body terminates early or is malformed. `bytes` disables `\u`/`\U` escapes.
pub fn decode_body(body: &str, quote: Quote, raw: bool, bytes: bool) -> Option<String> {
    let chars: Vec<char> = body.chars().collect();
    let q = quote.char();
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == q {
            if !quote.is_triple() {
                return None;
            }
            if chars.get(i + 1) == Some(&q) && chars.get(i + 2) == Some(&q) {
                return None;
            }
            out.push(c);
            i += 1;
            continue;
        }
        if c == '\n' && !quote.is_triple() {
            return None;
        }
        if c == '\r' {
            return None;
        }
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }
        let next = *chars.get(i + 1)?;
        if raw {
            out.push('\\');
            out.push(next);
            i += 2;
            continue;
        }
        i += 2;
        match next {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(next),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut value = next.to_digit(8)?;
                let mut taken = 0;
                while taken < 2 {
                    match chars.get(i).and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            i += 1;
                            taken += 1;
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value)?);
            }
            'x' => {
                let value = hex_value(chars.get(i..i + 2)?)?;
                out.push(char::from_u32(value)?);
                i += 2;
            }
            'u' if !bytes => {
                let value = hex_value(chars.get(i..i + 4)?)?;
                out.push(char::from_u32(value)?);
                i += 4;
            }
            'U' if !bytes => {
                let value = hex_value(chars.get(i..i + 8)?)?;
                out.push(char::from_u32(value)?);
                i += 8;
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    if quote.is_triple() && out.ends_with(q) && body.ends_with(q) && !body.ends_with(&format!("\\{}", q)) {
        return None;
    }
    Some(out)
}

fn shortest_literal<F>(prefix: &str, mut body: F, verify: impl Fn(&str, Quote, bool) -> bool) -> Option<String>
where
    F: FnMut(Quote, bool) -> Option<String>,
{
    let mut candidates: Vec<(String, Quote, bool, String)> = Vec::new();
    for raw in [false, true] {
        for quote in Quote::ALL {
            if let Some(text) = body(quote, raw) {
                let full = format!(
                    "{}{}{}{}{}",
                    if raw { "r" } else { "" },
                    prefix,
                    quote.as_str(),
                    text,
                    quote.as_str()
                );
                candidates.push((full, quote, raw, text));
            }
        }
    }
    candidates.sort_by_key(|(full, ..)| full.len());
    candidates
        .into_iter()
        .find(|(_, quote, raw, text)| verify(text, *quote, *raw))
        .map(|(full, ..)| full)
}

/// Shortest string literal evaluating to exactly `value`.
pub fn str_text(value: &str) -> String {
    let literal = shortest_literal(
        "",
        |quote, raw| {
            if raw && !value.contains('\\') {
                return None;
            }
            encode_str_body(value, quote, raw, false)
        },
        |text, quote, raw| decode_body(text, quote, raw, false).as_deref() == Some(value),
    );
    match literal {
        Some(literal) => literal,
        None => {
            // ASCII escaping is the representation of last resort.
            let body = encode_str_body(value, Quote::Single, false, true)
                .unwrap_or_else(|| unreachable!("plain single-quoted encoding always succeeds"));
            format!("'{}'", body)
        }
    }
}

/// Shortest bytes literal evaluating to exactly `value`.
pub fn bytes_text(value: &[u8]) -> String {
    let expected: String = value.iter().map(|&b| b as char).collect();
    let literal = shortest_literal(
        "b",
        |quote, raw| {
            if raw && !value.contains(&b'\\') {
                return None;
            }
            encode_bytes_body(value, quote, raw)
        },
        |text, quote, raw| decode_body(text, quote, raw, true).as_deref() == Some(expected.as_str()),
    );
    literal.unwrap_or_else(|| {
        let body = encode_bytes_body(value, Quote::Single, false)
            .unwrap_or_else(|| unreachable!("plain single-quoted encoding always succeeds"));
        format!("b'{}'", body)
    })
}

/// Minimal source text of a literal leaf. Negative numbers never reach here from a parsed
/// tree; they are spelled with a leading `-` for completeness.
pub fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::None => "None".to_string(),
        Literal::Bool(true) => "True".to_string(),
        Literal::Bool(false) => "False".to_string(),
        Literal::Ellipsis => "...".to_string(),
        Literal::Int(value) => int_text(value),
        Literal::Float(value) => float_text(*value),
        Literal::Complex(imag) => complex_text(*imag),
        Literal::Str(value) => str_text(value),
        Literal::Bytes(value) => bytes_text(value),
    }
}

/// Whether an integer literal is spelled as plain decimal digits, which can't be directly
/// followed by `.attr`.
pub fn is_plain_decimal(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_prefers_hex_only_when_shorter() {
        assert_eq!(int_text(&BigInt::from(255)), "255");
        assert_eq!(int_text(&BigInt::from(1_000_000_000_000u64)), "0xe8d4a51000");
        assert_eq!(int_text(&BigInt::from(0)), "0");
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(float_text(0.5), ".5");
        assert_eq!(float_text(1.5), "1.5");
        assert_eq!(float_text(100.0), "1e2");
        assert_eq!(float_text(10.0), "10.");
        assert_eq!(float_text(0.0), "0.");
        assert_eq!(float_text(1e-5), "1e-5");
        assert_eq!(float_text(f64::INFINITY), "1e999");
    }

    #[test]
    fn test_complex_forms() {
        assert_eq!(complex_text(2.0), "2j");
        assert_eq!(complex_text(0.5), ".5j");
        assert_eq!(complex_text(1e10), "1e10j");
    }

    #[test]
    fn test_str_quote_selection() {
        assert_eq!(str_text("hello"), "'hello'");
        assert_eq!(str_text("it's"), "\"it's\"");
        assert_eq!(str_text("a\nb"), "'a\\nb'");
        assert_eq!(str_text("a\\b"), "'a\\\\b'");
        assert_eq!(str_text("\\d+\\w"), "r'\\d+\\w'");
    }

    #[test]
    fn test_str_multiline_prefers_triple_when_shorter() {
        let value = "a\nb\nc\nd\ne\nf";
        assert_eq!(str_text(value), "'''a\nb\nc\nd\ne\nf'''");
    }

    #[test]
    fn test_bytes_escape_high_bytes() {
        assert_eq!(bytes_text(b"abc"), "b'abc'");
        assert_eq!(bytes_text(&[0xff, b'a']), "b'\\xffa'");
    }

    #[test]
    fn test_decode_rejects_early_termination() {
        assert_eq!(decode_body("a'b", Quote::Single, false, false), None);
        assert_eq!(
            decode_body("a\\'b", Quote::Single, false, false).as_deref(),
            Some("a'b")
        );
    }

    #[test]
    fn test_nul_before_digit_uses_hex_escape() {
        let text = str_text("\u{0}1");
        assert_eq!(text, "'\\x001'");
    }
}
