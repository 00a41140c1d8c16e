use super::{CharClass, EncodeError};

const HEX: &[u8; 16] = b"0123456789abcdef";

const HIGH_SURROGATE: std::ops::RangeInclusive<u16> = 0xD800..=0xDBFF;
const LOW_SURROGATE: std::ops::RangeInclusive<u16> = 0xDC00..=0xDFFF;

/// Percent encode `value`, leaving members of `allowed` untouched.
///
/// In form mode, space is written as `+` and a newline as `%0D%0A`, following
/// `application/x-www-form-urlencoded`.
pub fn encode(value: &str, allowed: &CharClass, form: bool) -> Result<String, EncodeError> {
    if value.is_empty() {
        return Ok(String::new());
    }
    encode_units(value.encode_utf16(), value.len(), allowed, form)
}

/// Percent encode a sequence of UTF-16 code units.
///
/// Unlike [`encode`], the input may contain malformed surrogate sequences, which are reported as
/// [`EncodeError::InvalidUtf16`].
pub fn encode_utf16(units: &[u16], allowed: &CharClass, form: bool) -> Result<String, EncodeError> {
    encode_units(units.iter().copied(), units.len(), allowed, form)
}

fn encode_units<I>(units: I, hint: usize, allowed: &CharClass, form: bool) -> Result<String, EncodeError>
where
    I: Iterator<Item = u16>,
{
    let mut out = String::with_capacity(hint);
    let mut units = units.enumerate().peekable();

    while let Some((position, unit)) = units.next() {
        if allowed.contains(unit) {
            // ASCII members only
            out.push(unit as u8 as char);
            continue;
        }

        if form {
            match unit {
                0x20 => {
                    out.push('+');
                    continue;
                }
                0x0A => {
                    out.push_str("%0D%0A");
                    continue;
                }
                _ => {}
            }
        }

        if !HIGH_SURROGATE.contains(&unit) && !LOW_SURROGATE.contains(&unit) {
            percent_utf8(unit as u32, &mut out)?;
            continue;
        }

        if LOW_SURROGATE.contains(&unit) {
            return Err(EncodeError::InvalidUtf16 { position, unit });
        }

        let low = match units.next_if(|(_, next)| LOW_SURROGATE.contains(next)) {
            Some((_, low)) => low,
            None => return Err(EncodeError::InvalidUtf16 { position, unit }),
        };

        let code = (((unit as u32 & 0x3FF) << 10) | (low as u32 & 0x3FF)) + 0x10000;
        percent_utf8(code, &mut out)?;
    }

    Ok(out)
}

/// Write the UTF-8 bytes of `code` as percent triplets.
///
/// Returns [`EncodeError::InvalidScalar`] if `code` is beyond `0x10FFFF`.
pub fn percent_utf8(code: u32, out: &mut String) -> Result<(), EncodeError> {
    if code < 0x80 {
        percent_byte(code as u8, out);
    } else if code < 0x800 {
        percent_byte(0xC0 | ((code >> 6) & 0x1F) as u8, out);
        percent_byte(0x80 | (code & 0x3F) as u8, out);
    } else if code < 0x10000 {
        percent_byte(0xE0 | ((code >> 12) & 0x0F) as u8, out);
        percent_byte(0x80 | ((code >> 6) & 0x3F) as u8, out);
        percent_byte(0x80 | (code & 0x3F) as u8, out);
    } else if code < 0x110000 {
        percent_byte(0xF0 | ((code >> 18) & 0x07) as u8, out);
        percent_byte(0x80 | ((code >> 12) & 0x3F) as u8, out);
        percent_byte(0x80 | ((code >> 6) & 0x3F) as u8, out);
        percent_byte(0x80 | (code & 0x3F) as u8, out);
    } else {
        return Err(EncodeError::InvalidScalar(code));
    }
    Ok(())
}

/// Write `byte` as `%` followed by two lowercase hex digits.
#[inline]
pub fn percent_byte(byte: u8, out: &mut String) {
    out.push('%');
    out.push(HEX[(byte >> 4) as usize] as char);
    out.push(HEX[(byte & 0x0F) as usize] as char);
}
