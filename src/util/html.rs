/// Literal-text escape opener that wraps most feed descriptions.
const CDATA_OPEN: &str = "<![CDATA[";

/// Characters trimmed from the end of an unwrapped escape block.
const CDATA_TRAILER: &[char] = &[']', '>'];

/// Named character references decoded after tag removal. `&amp;` is left alone:
/// decoding it would turn `&amp;lt;` into `&lt;`, which a later run decodes again.
const ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#39;", "'"),
];

/// Small markup cleaner for feed summaries.
/// - Unwraps a leading `<![CDATA[ ... ]]>` block
/// - Drops tags *and* everything nested inside an open/close pair
/// - Decodes a handful of character entities
///
/// The structural pass runs twice so markup revealed by unwrapping is removed too.
/// Entities are decoded once at the end; decoded `&lt;`/`&gt;` text is never
/// re-read as markup.
pub fn sanitize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let first = strip_pass(raw);
    let second = strip_pass(&first);
    decode_entities(second)
}

fn strip_pass(html: &str) -> String {
    let unwrapped;
    let body = if html.starts_with(CDATA_OPEN) {
        unwrapped = html.replace(CDATA_OPEN, "");
        unwrapped.trim_end_matches(CDATA_TRAILER)
    } else {
        html
    };

    let mut state = SanitizerState::default();
    let mut out = String::with_capacity(body.len());
    for ch in body.chars() {
        if let Some(visible) = state.step(ch) {
            out.push(visible);
        }
    }
    out
}

fn decode_entities(mut text: String) -> String {
    for (entity, literal) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, literal);
        }
    }
    text
}

/// Where the scanner currently is relative to tag markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Between tags. `closing` and `quoted` are leftovers from the last tag:
    /// a stray `>` still reads `closing`, and the next `<` resumes `quoted`.
    Outside { closing: bool, quoted: bool },
    InTag { closing: bool },
    InQuotedAttr { closing: bool },
}

impl Mode {
    fn closing(self) -> bool {
        match self {
            Mode::Outside { closing, .. }
            | Mode::InTag { closing }
            | Mode::InQuotedAttr { closing } => closing,
        }
    }

    fn quoted(self) -> bool {
        match self {
            Mode::Outside { quoted, .. } => quoted,
            Mode::InTag { .. } => false,
            Mode::InQuotedAttr { .. } => true,
        }
    }
}

/// One scan over one field. Depth is signed and never clamped: a self-closing
/// tag such as `<br/>` counts as a closer and can push it below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SanitizerState {
    depth: i64,
    mode: Mode,
}

impl Default for SanitizerState {
    fn default() -> Self {
        Self {
            depth: 0,
            mode: Mode::Outside {
                closing: false,
                quoted: false,
            },
        }
    }
}

impl SanitizerState {
    /// Advances over `ch`, returning it when it belongs in the output.
    fn step(&mut self, ch: char) -> Option<char> {
        match (ch, self.mode) {
            ('<', mode) => {
                self.mode = if mode.quoted() {
                    Mode::InQuotedAttr { closing: false }
                } else {
                    Mode::InTag { closing: false }
                };
                None
            }
            ('>', mode) => {
                if mode.closing() {
                    self.depth -= 1;
                } else {
                    self.depth += 1;
                }
                self.mode = Mode::Outside {
                    closing: mode.closing(),
                    quoted: mode.quoted(),
                };
                None
            }
            ('"' | '\'', Mode::InTag { closing }) => {
                self.mode = Mode::InQuotedAttr { closing };
                None
            }
            ('"' | '\'', Mode::InQuotedAttr { closing }) => {
                self.mode = Mode::InTag { closing };
                None
            }
            ('/', Mode::InTag { .. }) => {
                self.mode = Mode::InTag { closing: true };
                None
            }
            (_, Mode::InTag { .. } | Mode::InQuotedAttr { .. }) => None,
            (_, Mode::Outside { .. }) => (self.depth == 0).then_some(ch),
        }
    }
}
