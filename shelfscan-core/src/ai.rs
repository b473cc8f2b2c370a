//! GS1 Application Identifier table and the raw-to-bracketed decoder.
//!
//! Scanners hand us payloads in two shapes:
//!   (01)06297000001234(17)250630(10)ABC001      human-readable, bracketed
//!   010629700000123417250630<GS>10ABC001        raw element string
//!
//! The decoder rebuilds the bracketed shape from the raw one. Fixed-length AIs
//! take exactly their length. Variable-length AIs run to the end of the current
//! separator-delimited part, so two variable fields with no separator between
//! them cannot be told apart; the second one ends up inside the first value.

use log::warn;

/// Single marker every group-separator spelling is normalized to (ASCII GS).
pub const GROUP_SEPARATOR: char = '\u{1D}';

/// AI code -> fixed value length; 0 means variable length.
const AI_TABLE: &[(&str, usize)] = &[
    ("00", 18),
    ("01", 14),
    ("02", 14),
    ("10", 0),
    ("11", 6),
    ("12", 6),
    ("13", 6),
    ("15", 6),
    ("16", 6),
    ("17", 6),
    ("20", 2),
    ("21", 0),
    ("22", 0),
    ("30", 0),
    ("37", 0),
    ("90", 0),
    ("91", 0),
    ("92", 0),
    ("93", 0),
    ("94", 0),
    ("95", 0),
    ("96", 0),
    ("97", 0),
    ("98", 0),
    ("99", 0),
    ("240", 0),
    ("241", 0),
    ("242", 0),
    ("250", 0),
    ("251", 0),
    ("253", 0),
    ("254", 0),
    ("400", 0),
    ("401", 0),
    ("402", 17),
    ("403", 0),
    ("410", 13),
    ("411", 13),
    ("412", 13),
    ("413", 13),
    ("414", 13),
    ("415", 13),
    ("420", 0),
    ("421", 0),
    ("422", 3),
    ("423", 0),
    ("424", 3),
    ("425", 0),
    ("426", 3),
];

/// AIM symbology identifiers a scanner may prefix to the payload.
const SYMBOLOGY_IDS: &[&str] = &["]C1", "]d2", "]e0", "]Q3", "]J1"];

/// Textual spellings of the group separator seen in keyboard-wedge and test input.
const SEPARATOR_PLACEHOLDERS: &[&str] = &["<GS>", "{GS}", "[GS]", "\\x1D", "\\x1d", "^]"];

/// Fixed length for a known AI code, `Some(0)` for variable length.
pub fn ai_length(code: &str) -> Option<usize> {
    AI_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, len)| *len)
}

/// Trim, drop a symbology identifier, and map every separator spelling to [`GROUP_SEPARATOR`].
pub fn normalize_payload(raw: &str) -> String {
    let mut s = raw.trim();
    for id in SYMBOLOGY_IDS {
        if let Some(rest) = s.strip_prefix(id) {
            s = rest;
            break;
        }
    }

    let mut out = s.to_string();
    for placeholder in SEPARATOR_PLACEHOLDERS {
        if out.contains(placeholder) {
            out = out.replace(placeholder, &GROUP_SEPARATOR.to_string());
        }
    }
    out
}

/// Output of one raw decode pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    /// Characters dropped because neither a 3- nor a 2-character AI started there.
    pub skipped_chars: usize,
}

fn match_ai_at(chars: &[char], pos: usize) -> Option<(&'static str, usize)> {
    for width in [3, 2] {
        if pos + width > chars.len() {
            continue;
        }
        let candidate: String = chars[pos..pos + width].iter().collect();
        if let Some(&(code, len)) = AI_TABLE.iter().find(|(c, _)| *c == candidate) {
            return Some((code, len));
        }
    }
    None
}

/// Rebuild `(AI)value` markers from a raw element string.
///
/// No value crosses a group separator. Unknown positions are skipped one
/// character at a time and counted in [`Decoded::skipped_chars`].
pub fn decode_raw(payload: &str) -> Decoded {
    let mut text = String::with_capacity(payload.len() + 8);
    let mut skipped_chars = 0usize;

    for part in payload.split(GROUP_SEPARATOR) {
        let chars: Vec<char> = part.chars().collect();
        let mut pos = 0usize;

        while pos < chars.len() {
            let Some((code, fixed_len)) = match_ai_at(&chars, pos) else {
                skipped_chars += 1;
                pos += 1;
                continue;
            };

            let start = pos + code.len();
            let remaining = chars.len() - start;
            let take = if fixed_len > 0 {
                fixed_len.min(remaining)
            } else {
                remaining
            };

            text.push('(');
            text.push_str(code);
            text.push(')');
            text.extend(&chars[start..start + take]);
            pos = start + take;
        }
    }

    Decoded { text, skipped_chars }
}

/// Bracketed form of `payload`, plus how many characters the decoder dropped.
///
/// Input that already has a `(` is returned as-is, and so is input in which the
/// decoder found no AI at all.
pub fn decode_payload(payload: &str) -> Decoded {
    let unchanged = || Decoded {
        text: payload.to_string(),
        skipped_chars: 0,
    };

    if payload.contains('(') {
        return unchanged();
    }

    let decoded = decode_raw(payload);
    if !decoded.text.contains('(') {
        return unchanged();
    }
    if decoded.skipped_chars > 0 {
        warn!(
            "decoder skipped {} unrecognized character(s) in payload {:?}",
            decoded.skipped_chars, payload
        );
    }
    decoded
}

/// [`decode_payload`] without the diagnostic.
pub fn decode(payload: &str) -> String {
    decode_payload(payload).text
}
