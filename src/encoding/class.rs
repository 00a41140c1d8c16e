//! Character classes of [RFC3986] and [RFC2616] grammars.
//!
//! [RFC3986]: <https://datatracker.ietf.org/doc/html/rfc3986#appendix-A>
//! [RFC2616]: <https://datatracker.ietf.org/doc/html/rfc2616#section-2.2>

/// An immutable set of ASCII characters.
///
/// Membership test is a single table lookup. Any code unit outside ASCII is never a member.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CharClass([bool; 128]);

impl CharClass {
    /// Returns `true` if the UTF-16 code unit is a member of the class.
    #[inline]
    pub const fn contains(&self, unit: u16) -> bool {
        unit < 128 && self.0[unit as usize]
    }

    /// Returns `true` if the byte is a member of the class.
    #[inline]
    pub const fn contains_byte(&self, byte: u8) -> bool {
        byte < 128 && self.0[byte as usize]
    }

    /// Returns `true` if the character is a member of the class.
    #[inline]
    pub const fn contains_char(&self, ch: char) -> bool {
        (ch as u32) < 128 && self.0[ch as usize]
    }

    /// Returns `true` if every character of `value` is a member of the class.
    pub fn matches(&self, value: &str) -> bool {
        value.bytes().all(|byte| self.contains_byte(byte))
    }

    /// Returns the number of members.
    pub const fn len(&self) -> usize {
        let mut len = 0;
        let mut i = 0;
        while i < 128 {
            if self.0[i] {
                len += 1;
            }
            i += 1;
        }
        len
    }

    /// Returns `true` if the class has no member.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CharClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let members = (0u8..128)
            .filter(|byte| self.0[*byte as usize])
            .map(char::from);
        f.debug_tuple("CharClass")
            .field(&members.collect::<String>())
            .finish()
    }
}

macro_rules! char_class {
    {
        $(
            $(#[$meta:meta])*
            $vis:vis const $id:ident = |$byte:ident| $e:expr;
        )*
    } => {
        $(
            $(#[$meta])*
            $vis const $id: CharClass = {
                let mut table = [false; 128];
                let mut $byte = 0u8;
                loop {
                    table[$byte as usize] = $e;
                    if $byte == 127 {
                        break;
                    }
                    $byte += 1;
                }
                CharClass(table)
            };
        )*
    };
}

// ===== RFC3986 =====

char_class! {
    /// ALPHA = %x41-5A / %x61-7A
    pub const ALPHA = |byte| byte.is_ascii_alphabetic();

    /// DIGIT = %x30-39
    pub const NUMERIC = |byte| byte.is_ascii_digit();

    /// ALPHA / DIGIT
    pub const ALPHANUMERIC = |byte| ALPHA.contains_byte(byte) || NUMERIC.contains_byte(byte);

    /// unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"
    pub const UNRESERVED = |byte| {
        ALPHANUMERIC.contains_byte(byte) || matches!(byte, b'-' | b'.' | b'_' | b'~')
    };

    /// gen-delims = ":" / "/" / "?" / "#" / "[" / "]" / "@"
    pub const GEN_DELIMS = |byte| matches!(byte, b':' | b'/' | b'?' | b'#' | b'[' | b']' | b'@');

    /// sub-delims = "!" / "$" / "&" / "'" / "(" / ")"
    ///            / "*" / "+" / "," / ";" / "="
    pub const SUB_DELIMS = |byte| {
        matches!(
            byte,
            b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
        )
    };

    /// reserved = gen-delims / sub-delims
    pub const RESERVED = |byte| GEN_DELIMS.contains_byte(byte) || SUB_DELIMS.contains_byte(byte);

    /// pchar = unreserved / sub-delims / ":" / "@"
    ///
    /// `pct-encoded` is left out, a literal `%` is always escaped.
    pub const PCHAR = |byte| {
        UNRESERVED.contains_byte(byte)
        || SUB_DELIMS.contains_byte(byte)
        || matches!(byte, b':' | b'@')
    };
}

// ===== Wire positions =====

char_class! {
    /// segment = pchar, without ";"
    pub const PATH_SEGMENT = |byte| PCHAR.contains_byte(byte) && byte != b';';

    /// matrix parameter name = pchar, without ";" and "="
    pub const PATH_PARAM_NAME = |byte| PCHAR.contains_byte(byte) && !matches!(byte, b';' | b'=');

    /// matrix parameter value = pchar, without ";"
    pub const PATH_PARAM_VALUE = |byte| PCHAR.contains_byte(byte) && byte != b';';

    /// query = *( pchar / "/" / "?" ), without "=", "&" and "+"
    ///
    /// "+" is decoded as a space by most servers.
    pub const QUERY = |byte| {
        (PCHAR.contains_byte(byte) || matches!(byte, b'/' | b'?'))
        && !matches!(byte, b'=' | b'&' | b'+')
    };

    /// fragment = *( pchar / "/" / "?" )
    pub const FRAGMENT = |byte| PCHAR.contains_byte(byte) || matches!(byte, b'/' | b'?');

    /// Characters left alone when escaping a whole URI: reserved and unreserved, except "[" and "]".
    pub const WHOLE_URI = |byte| {
        (UNRESERVED.contains_byte(byte) || RESERVED.contains_byte(byte))
        && !matches!(byte, b'[' | b']')
    };
}

// ===== RFC2616 =====

char_class! {
    /// CHAR without CTLs
    pub const HTTP_CHAR = |byte| byte >= 32 && byte < 127;

    /// separators = "(" | ")" | "<" | ">" | "@"
    ///            | "," | ";" | ":" | "\" | <">
    ///            | "/" | "[" | "]" | "?" | "="
    ///            | "{" | "}" | SP | HT
    pub const HTTP_SEPARATORS = |byte| {
        matches!(
            byte,
            | b'(' | b')' | b'<' | b'>' | b'@'
            | b',' | b';' | b':' | b'\\' | b'"'
            | b'/' | b'[' | b']' | b'?' | b'='
            | b'{' | b'}' | b' ' | b'\t'
        )
    };

    /// token = 1*<any CHAR except CTLs or separators>
    pub const HTTP_TOKEN = |byte| HTTP_CHAR.contains_byte(byte) && !HTTP_SEPARATORS.contains_byte(byte);
}

/// Returns `true` if `value` is a non-empty RFC2616 token, e.g. a valid header name.
pub fn is_http_token(value: &str) -> bool {
    !value.is_empty() && HTTP_TOKEN.matches(value)
}
