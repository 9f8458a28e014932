//! Scalar encoder: atomic values rendered straight into a [`Buffer`].

use crate::buffer::Buffer;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// How many low-order bytes of an identity are printed. Shortened to 6 bytes
/// on 64-bit targets; the high bytes of a pointer carry no information.
const IDENTITY_BYTES: usize = if std::mem::size_of::<usize>() >= 8 {
    6
} else {
    std::mem::size_of::<usize>()
};

/// Append a general-format ("%g"-class) rendering of a float: six significant
/// digits, fixed notation for decimal exponents in [-4, 6), exponential
/// notation otherwise, trailing zeros trimmed.
pub fn push_number(buf: &mut Buffer, x: f64) {
    if x.is_nan() {
        buf.push_str("nan");
        return;
    }
    if x.is_infinite() {
        buf.push_str(if x.is_sign_negative() { "-inf" } else { "inf" });
        return;
    }
    if x == 0.0 {
        if x.is_sign_negative() {
            buf.push(b'-');
        }
        buf.push(b'0');
        return;
    }

    buf.reserve(24);
    // Six significant digits via scientific notation, then re-laid-out.
    let sci = format!("{:.5e}", x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if mantissa.starts_with('-') {
        buf.push(b'-');
    }
    let digits: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();

    if !(-4..6).contains(&exp) {
        let mut last = digits.len();
        while last > 1 && digits[last - 1] == b'0' {
            last -= 1;
        }
        buf.push(digits[0]);
        if last > 1 {
            buf.push(b'.');
            buf.push_bytes(&digits[1..last]);
        }
        buf.push(b'e');
        buf.push(if exp < 0 { b'-' } else { b'+' });
        let mag = exp.unsigned_abs();
        if mag < 10 {
            buf.push(b'0');
        }
        push_integer_wide(buf, i64::from(mag));
    } else if exp >= 0 {
        let point = exp as usize + 1;
        buf.push_bytes(&digits[..point]);
        let mut last = digits.len();
        while last > point && digits[last - 1] == b'0' {
            last -= 1;
        }
        if last > point {
            buf.push(b'.');
            buf.push_bytes(&digits[point..last]);
        }
    } else {
        buf.push_bytes(b"0.");
        for _ in exp..-1 {
            buf.push(b'0');
        }
        let mut last = digits.len();
        while last > 1 && digits[last - 1] == b'0' {
            last -= 1;
        }
        buf.push_bytes(&digits[..last]);
    }
}

/// Append a decimal integer. Widens internally so `i32::MIN` has a defined
/// rendering (naive two's-complement negation would overflow).
pub fn push_integer(buf: &mut Buffer, x: i32) {
    push_integer_wide(buf, i64::from(x));
}

pub fn push_integer_wide(buf: &mut Buffer, x: i64) {
    if x == 0 {
        buf.push(b'0');
        return;
    }
    if x < 0 {
        buf.push(b'-');
    }
    let mut mag = x.unsigned_abs();
    let mut digits = [0u8; 20];
    let mut i = digits.len();
    while mag > 0 {
        i -= 1;
        digits[i] = b'0' + (mag % 10) as u8;
        mag /= 10;
    }
    buf.push_bytes(&digits[i..]);
}

/// Append `<title 0xHHHH…>` for an opaque identity. The title is truncated to
/// 32 bytes; the hex field is fixed-width and never a dereferenceable address.
pub fn push_identity(buf: &mut Buffer, title: &str, addr: usize) {
    buf.reserve(36 + 2 * IDENTITY_BYTES);
    buf.push(b'<');
    let name = title.as_bytes();
    buf.push_bytes(&name[..name.len().min(32)]);
    buf.push_bytes(b" 0x");
    for i in (0..IDENTITY_BYTES).rev() {
        let byte = (addr >> (i * 8)) as u8;
        buf.push(HEX_DIGITS[(byte >> 4) as usize]);
        buf.push(HEX_DIGITS[(byte & 0xF) as usize]);
    }
    buf.push(b'>');
}

/// Append a double-quoted, escaped rendering of raw bytes.
pub fn push_escaped(buf: &mut Buffer, bytes: &[u8]) {
    buf.push(b'"');
    for &c in bytes {
        match c {
            b'"' => buf.push_bytes(b"\\\""),
            b'\n' => buf.push_bytes(b"\\n"),
            b'\r' => buf.push_bytes(b"\\r"),
            0 => buf.push_bytes(b"\\0"),
            b'\\' => buf.push_bytes(b"\\\\"),
            c if c < 32 || c > 127 => {
                buf.push_bytes(b"\\x");
                buf.push(HEX_DIGITS[(c >> 4) as usize]);
                buf.push(HEX_DIGITS[(c & 0xF) as usize]);
            }
            c => buf.push(c),
        }
    }
    buf.push(b'"');
}
