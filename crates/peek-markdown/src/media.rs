// Media substitution passes around the Markdown engine: hosted videos become
// placeholders before parsing and <video> blocks after; images get a linked
// wrapper with a caption.

use std::sync::OnceLock;

use pulldown_cmark_escape::escape_html;
use regex::{Captures, Regex};

fn video_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"!\[(.*?)\]\((https://user-images\.githubusercontent\.com/.*?\.(?:mp4|mov|webm).*?)\)",
        )
        .unwrap()
    })
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<!-- VIDEO_PLACEHOLDER:(.*?):(.*?) -->").unwrap())
}

fn img_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<img(.*?)src="(.*?)"(.*?)\s*/?>"#).unwrap())
}

fn alt_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"alt="([^"]*)""#).unwrap())
}

fn extension_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.([a-z0-9]+)(?:[?#]|$)").unwrap())
}

/// Escape text for use inside a double-quoted attribute or element body.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    if let Err(e) = escape_html(&mut out, text) {
        log::warn!("html escape failed: {}", e);
    }
    out
}

/// Percent-encode the characters that would end the alt field or the comment
/// of a placeholder.
fn encode_alt(alt: &str) -> String {
    let mut out = String::with_capacity(alt.len());
    for c in alt.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            '>' => out.push_str("%3E"),
            _ => out.push(c),
        }
    }
    out
}

fn decode_alt(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut rest = encoded;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = match tail.get(..3) {
            Some("%25") => Some('%'),
            Some("%3A") => Some(':'),
            Some("%3E") => Some('>'),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[3..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Lower-cased file extension of a URL, or an empty string.
pub fn file_extension(url: &str) -> String {
    extension_re()
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Replace hosted video embeds with comment placeholders the Markdown parser
/// passes through untouched. Query strings are dropped from the URL.
pub fn extract_videos(text: &str) -> String {
    video_link_re()
        .replace_all(text, |caps: &Captures| {
            let alt = encode_alt(&caps[1]);
            let url = caps[2].split('?').next().unwrap_or_default();
            format!("<!-- VIDEO_PLACEHOLDER:{}:{} -->", alt, url)
        })
        .into_owned()
}

/// Turn video placeholders back into <video> blocks.
pub fn expand_videos(html: &str) -> String {
    placeholder_re()
        .replace_all(html, |caps: &Captures| {
            let alt = escape(&decode_alt(&caps[1]));
            let url = escape(&caps[2]);
            let caption = if alt.is_empty() {
                String::new()
            } else {
                format!("<p class=\"markdown-video-caption\">{}</p>", alt)
            };
            format!(
                "<div class=\"markdown-video-container\"><div class=\"markdown-video-wrapper\">\
                 <video controls alt=\"{alt}\" class=\"markdown-video\" preload=\"metadata\">\
                 <source src=\"{url}\" type=\"video/{ext}\">\
                 Your browser does not support the video tag.</video>{caption}</div></div>",
                alt = alt,
                url = url,
                ext = file_extension(&caps[2]),
                caption = caption,
            )
        })
        .into_owned()
}

/// Wrap every <img> in a linked wrapper with an optional caption, adding the
/// image class and a default inline style when the tag has none.
pub fn wrap_images(html: &str) -> String {
    img_re()
        .replace_all(html, |caps: &Captures| {
            let prefix = &caps[1];
            let src = &caps[2];
            let suffix = &caps[3];
            let attrs = format!("{}{}", prefix, suffix);

            let alt = alt_re()
                .captures(&attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            let class = if attrs.contains("class=\"") {
                ""
            } else {
                " class=\"markdown-image\""
            };
            let style = if attrs.contains("style=\"") {
                ""
            } else {
                " style=\"max-width: 100%; border-radius: 6px;\""
            };
            let caption = if alt.is_empty() {
                String::new()
            } else {
                format!("<p class=\"markdown-image-caption\">{}</p>", alt)
            };

            format!(
                "<div class=\"markdown-image-wrapper\">\
                 <a class=\"markdown-image-link\" href=\"{src}\" target=\"_blank\" rel=\"noopener noreferrer\">\
                 <img{prefix}src=\"{src}\"{suffix}{class}{style} /></a>{caption}</div>",
            )
        })
        .into_owned()
}
