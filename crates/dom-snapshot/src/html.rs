//! Lenient HTML parser
//!
//! Good enough for captured page markup and test fixtures: it does not run
//! the full HTML5 tree-construction algorithm, but it never reorders nodes,
//! so sibling positions match what was written.

use tracing::debug;

use crate::document::Document;
use crate::errors::DomError;
use crate::model::NodeId;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

impl Document {
    /// Parse markup into a new document.
    pub fn parse_html(html: &str) -> Result<Document, DomError> {
        let mut doc = Document::new();
        let mut stack: Vec<(NodeId, String)> = Vec::new();
        let bytes = html.as_bytes();
        let mut i = 0usize;

        while i < bytes.len() {
            if html[i..].starts_with("<!--") {
                let end = html[i + 4..]
                    .find("-->")
                    .ok_or_else(|| DomError::HtmlParse("unclosed HTML comment".into()))?;
                i += 4 + end + 3;
                continue;
            }

            if html[i..].starts_with("<!") || html[i..].starts_with("<?") {
                // doctype and processing instructions carry no nodes we keep
                let end = html[i..]
                    .find('>')
                    .ok_or_else(|| DomError::HtmlParse("unclosed markup declaration".into()))?;
                i += end + 1;
                continue;
            }

            if html[i..].starts_with("</") {
                let (tag, next) = parse_end_tag(html, i)?;
                i = next;
                if let Some(pos) = stack.iter().rposition(|(_, open)| *open == tag) {
                    stack.truncate(pos);
                } else {
                    debug!(tag = %tag, "ignoring stray end tag");
                }
                continue;
            }

            if bytes[i] == b'<' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_alphabetic()) {
                let start = parse_start_tag(html, i)?;
                i = start.next;
                let parent = stack.last().map(|(node, _)| *node).unwrap_or(doc.root());
                let node = doc.create_element(Some(parent), &start.tag, start.attributes)?;

                if RAW_TEXT_TAGS.contains(&start.tag.as_str()) && !start.self_closing {
                    let close = find_raw_text_end(html, i, &start.tag).ok_or_else(|| {
                        DomError::HtmlParse(format!("unclosed <{}>", start.tag))
                    })?;
                    let body = &html[i..close];
                    if !body.is_empty() {
                        let text = if start.tag == "script" || start.tag == "style" {
                            body.to_string()
                        } else {
                            decode_character_references(body)
                        };
                        doc.append_text(node, text)?;
                    }
                    let (_, after) = parse_end_tag(html, close)?;
                    i = after;
                    continue;
                }

                if !start.self_closing && !VOID_TAGS.contains(&start.tag.as_str()) {
                    stack.push((node, start.tag));
                }
                continue;
            }

            let text_start = i;
            i += 1;
            while i < bytes.len() && bytes[i] != b'<' {
                i += 1;
            }
            let parent = stack.last().map(|(node, _)| *node).unwrap_or(doc.root());
            doc.append_text(parent, decode_character_references(&html[text_start..i]))?;
        }

        Ok(doc)
    }
}

struct StartTag {
    tag: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
    next: usize,
}

fn parse_start_tag(html: &str, at: usize) -> Result<StartTag, DomError> {
    let bytes = html.as_bytes();
    let mut i = at + 1;

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();

    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return Err(DomError::HtmlParse(format!("unclosed start tag <{tag}")));
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                self_closing = true;
                i += 2;
                break;
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        if name_start == i {
            return Err(DomError::HtmlParse(format!(
                "invalid attribute in <{tag}> at byte {i}"
            )));
        }
        let name = html[name_start..i].to_ascii_lowercase();

        skip_ws(bytes, &mut i);
        let value = if bytes.get(i) == Some(&b'=') {
            i += 1;
            skip_ws(bytes, &mut i);
            parse_attr_value(html, &mut i)?
        } else {
            String::new()
        };
        attributes.push((name, value));
    }

    Ok(StartTag {
        tag,
        attributes,
        self_closing,
        next: i,
    })
}

fn parse_end_tag(html: &str, at: usize) -> Result<(String, usize), DomError> {
    let bytes = html.as_bytes();
    let mut i = at + 2;
    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();
    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return Err(DomError::HtmlParse(format!("unclosed end tag </{tag}")));
    }
    Ok((tag, i + 1))
}

fn parse_attr_value(html: &str, i: &mut usize) -> Result<String, DomError> {
    let bytes = html.as_bytes();
    match bytes.get(*i) {
        Some(&quote @ (b'"' | b'\'')) => {
            *i += 1;
            let start = *i;
            while *i < bytes.len() && bytes[*i] != quote {
                *i += 1;
            }
            if *i >= bytes.len() {
                return Err(DomError::HtmlParse("unclosed quoted attribute value".into()));
            }
            let value = decode_character_references(&html[start..*i]);
            *i += 1;
            Ok(value)
        }
        Some(_) => {
            let start = *i;
            while *i < bytes.len() && !bytes[*i].is_ascii_whitespace() && bytes[*i] != b'>' {
                *i += 1;
            }
            Ok(decode_character_references(&html[start..*i]))
        }
        None => Err(DomError::HtmlParse("missing attribute value".into())),
    }
}

fn find_raw_text_end(html: &str, from: usize, tag: &str) -> Option<usize> {
    let lower = html[from..].to_ascii_lowercase();
    let needle = format!("</{tag}");
    lower.find(&needle).map(|pos| from + pos)
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_attr_name_char(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'"' | b'\'' | b'>' | b'/' | b'=' | b'<')
}

fn decode_character_references(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let decoded = rest.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            decode_entity(entity).map(|ch| (ch, end + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = entity.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
