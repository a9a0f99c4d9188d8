// SPDX-License-Identifier: GPL-3.0-or-later

//! Plain-text rendering of the HTML `setlistdata` field.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Convert a Phish.net setlist body into a single readable line.
///
/// ```
/// use phishnet_client::clean_setlist;
///
/// let html = "<p><span class='set-label'>Set 1</span>: \
///             <a href='/song/llama'>Llama</a> &gt; <a>Tweezer</a></p>";
/// assert_eq!(clean_setlist(html), "Set 1: Llama > Tweezer");
/// ```
pub fn clean_setlist(html: &str) -> String {
    let without_notes = strip_footnote_markers(html);
    let spaced = break_blocks(&without_notes);
    let text = strip_tags(&spaced);
    let decoded = decode_entities(&text);
    normalize_whitespace(&decoded)
}

fn strip_footnote_markers(value: &str) -> String {
    lazy_static! {
        static ref SUP_REGEX: Regex =
            Regex::new(r"(?is)<sup\b[^>]*>.*?</sup>").expect("valid footnote regex");
    }

    SUP_REGEX.replace_all(value, "").to_string()
}

fn break_blocks(value: &str) -> String {
    lazy_static! {
        static ref BLOCK_REGEX: Regex =
            Regex::new(r"(?i)</?p\b[^>]*>|<br\s*/?>").expect("valid block regex");
    }

    BLOCK_REGEX.replace_all(value, " ").to_string()
}

fn strip_tags(value: &str) -> String {
    lazy_static! {
        static ref TAG_REGEX: Regex = Regex::new(r"<[^>]*>").expect("valid tag regex");
    }

    TAG_REGEX.replace_all(value, "").to_string()
}

fn decode_entities(value: &str) -> String {
    lazy_static! {
        static ref ENTITY_REGEX: Regex =
            Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity regex");
    }

    ENTITY_REGEX
        .replace_all(value, |caps: &Captures| {
            let body = &caps[1];
            decode_entity(body).unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(hex) = body
        .strip_prefix("#x")
        .or_else(|| body.strip_prefix("#X"))
    {
        return u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }

    if let Some(decimal) = body.strip_prefix('#') {
        return decimal
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }

    let decoded = match body {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "rsquo" | "lsquo" => "'",
        "rdquo" | "ldquo" => "\"",
        "ndash" => "-",
        "mdash" => "--",
        "hellip" => "...",
        _ => return None,
    };
    Some(decoded.to_string())
}

fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
