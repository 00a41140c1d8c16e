use super::*;

macro_rules! assert_encode {
    ($($ctx:ident: $input:expr => $expected:expr;)*) => {
        $(
            assert_eq!(Context::$ctx.encode($input).unwrap(), $expected, "{:?} in {:?}", $input, Context::$ctx);
        )*
    };
}

const CONTEXTS: [Context; 7] = [
    Context::Form,
    Context::Query,
    Context::PathSegment,
    Context::MatrixName,
    Context::MatrixValue,
    Context::Fragment,
    Context::WholeUri,
];

#[test]
fn test_unreserved_passthrough() {
    let unreserved = "AZaz09-._~";
    for ctx in CONTEXTS.iter().filter(|ctx| !ctx.is_form()) {
        assert_eq!(encode(unreserved, ctx.class(), false).unwrap(), unreserved);
    }

    // form names and values only keep alphanumerics
    assert_eq!(encode_form_name_or_value("AZaz09").unwrap(), "AZaz09");
    assert_eq!(encode_form_name_or_value("a-b.c_d~").unwrap(), "a%2db%2ec%5fd%7e");
}

#[test]
fn test_empty() {
    for ctx in CONTEXTS {
        assert_eq!(ctx.encode("").unwrap(), "");
    }
    assert_eq!(encode_utf16(&[], &class::QUERY, false).unwrap(), "");
}

#[test]
fn test_form_substitution() {
    assert_encode! {
        Form: "a b" => "a+b";
        Form: "a\nb" => "a%0D%0Ab";
        Form: "a\r\nb" => "a%0d%0D%0Ab";
        Form: "x=1&y=2" => "x%3d1%26y%3d2";
        Form: "50%" => "50%25";
    }
}

#[test]
fn test_non_form_space_and_newline() {
    assert_encode! {
        Query: "a b" => "a%20b";
        Query: "a\nb" => "a%0ab";
        PathSegment: " " => "%20";
        Fragment: "\t" => "%09";
    }
}

#[test]
fn test_context_classes() {
    assert_encode! {
        Query: "a=b&c+d" => "a%3db%26c%2bd";
        Query: "/path?x" => "/path?x";
        Query: "!$'()*,;:@~" => "!$'()*,;:@~";
        PathSegment: "a;b=c/d" => "a%3bb=c%2fd";
        MatrixName: "a;b=c" => "a%3bb%3dc";
        MatrixValue: "a;b=c" => "a%3bb=c";
        Fragment: "sec/1?x+y" => "sec/1?x+y";
        Fragment: "a#b" => "a%23b";
        WholeUri: "a b#c[d]" => "a%20b#c%5Bd%5D";
    }
}

#[test]
fn test_multibyte() {
    let e_acute = Context::Query.encode("\u{e9}").unwrap();
    assert_eq!(e_acute, "%c3%a9");
    assert!(e_acute.eq_ignore_ascii_case("%C3%A9"));

    let grinning = Context::PathSegment.encode("\u{1F600}").unwrap();
    assert_eq!(grinning, "%f0%9f%98%80");
    assert!(grinning.eq_ignore_ascii_case("%F0%9F%98%80"));

    // the same scalar value given as a surrogate pair
    let pair = encode_utf16(&[0xD83D, 0xDE00], &class::PATH_SEGMENT, false).unwrap();
    assert_eq!(pair, grinning);

    assert_eq!(encode_form_name_or_value("\u{e9} \u{e9}").unwrap(), "%c3%a9+%c3%a9");
}

#[test]
fn test_utf8_thresholds() {
    macro_rules! assert_utf8 {
        ($($code:literal => $expected:literal;)*) => {
            $(
                let mut out = String::new();
                percent_utf8($code, &mut out).unwrap();
                assert_eq!(out, $expected, "{:#x}", $code);
            )*
        };
    }

    assert_utf8! {
        0x00 => "%00";
        0x0F => "%0f";
        0x10 => "%10";
        0x7F => "%7f";
        0x80 => "%c2%80";
        0x7FF => "%df%bf";
        0x800 => "%e0%a0%80";
        0xFFFF => "%ef%bf%bf";
        0x10000 => "%f0%90%80%80";
        0x10FFFF => "%f4%8f%bf%bf";
    }
}

#[test]
fn test_utf8_matches_std() {
    for ch in ['\u{1}', 'z', '\u{a9}', '\u{20ac}', '\u{d7ff}', '\u{e000}', '\u{1f980}'] {
        let mut expected = String::new();
        let mut buf = [0u8; 4];
        for byte in ch.encode_utf8(&mut buf).bytes() {
            percent_byte(byte, &mut expected);
        }

        let mut out = String::new();
        percent_utf8(ch as u32, &mut out).unwrap();
        assert_eq!(out, expected);
    }
}

#[test]
fn test_out_of_range() {
    let mut out = String::new();
    assert_eq!(percent_utf8(0x110000, &mut out), Err(EncodeError::InvalidScalar(0x110000)));
    assert!(percent_utf8(u32::MAX, &mut out).is_err());
}

#[test]
fn test_invalid_surrogates() {
    let q = &class::QUERY;

    // lone high surrogate at end of input
    let units: Vec<u16> = "ab".encode_utf16().chain([0xD83D]).collect();
    assert_eq!(
        encode_utf16(&units, q, false),
        Err(EncodeError::InvalidUtf16 { position: 2, unit: 0xD83D })
    );

    // high surrogate followed by a non low surrogate
    let units = [0xD83D, 'a' as u16];
    assert_eq!(
        encode_utf16(&units, q, false),
        Err(EncodeError::InvalidUtf16 { position: 0, unit: 0xD83D })
    );

    // two high surrogates
    assert!(encode_utf16(&[0xD800, 0xD800, 0xDC00], q, false).is_err());

    // low surrogate first
    assert_eq!(
        encode_utf16(&[0xDE00, 0xD83D], q, true),
        Err(EncodeError::InvalidUtf16 { position: 0, unit: 0xDE00 })
    );
}

#[test]
fn test_output_alphabet() {
    let input = "h\u{e9}llo w\u{f6}rld!\n\"<>{}|\\^`[]%\u{1F600}";
    for ctx in CONTEXTS {
        let out = ctx.encode(input).unwrap();
        for ch in out.chars() {
            assert!(
                ch.is_ascii_alphanumeric() || matches!(ch, '%' | '+') || ctx.class().contains_char(ch),
                "{ch:?} in {ctx:?}"
            );
        }
        assert!(!out.contains(char::is_whitespace));
    }
}

#[test]
fn test_whole_uri_uppercase() {
    assert_eq!(Context::WholeUri.encode("caf\u{e9} [x]").unwrap(), "caf%C3%A9%20%5Bx%5D");
    // members are never touched, only triplet digits
    assert_eq!(Context::WholeUri.encode("abc/def?g=h").unwrap(), "abc/def?g=h");
    assert_eq!(Context::Query.encode("[x]").unwrap(), "%5bx%5d");
}

#[test]
fn test_deterministic() {
    let first = encode_form_name_or_value("na me=\u{e9}").unwrap();
    let second = encode_form_name_or_value("na me=\u{e9}").unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "na+me%3d%c3%a9");
}

#[test]
fn test_header_passthrough() {
    assert_eq!(encode_header_name("X-Weird Name"), "X-Weird Name");
    assert_eq!(encode_header_value("a b; c=\u{e9}"), "a b; c=\u{e9}");
}
