//! Line-oriented item extraction for loosely formed RSS/RDF text.
//!
//! Each structural marker and each field value must sit on a single physical
//! line. Fields broken across lines are not captured; that is part of the input
//! contract, not something the extractor tries to repair.

use std::{mem, str::Lines};

use crate::util::html::sanitize;

/// Prefix of an item-open line. Attributes (`<item rdf:about="...">`) are tolerated.
pub const ITEM_OPEN: &str = "<item";
pub const ITEM_CLOSE: &str = "</item>";
pub const TITLE_OPEN: &str = "<title>";
pub const TITLE_CLOSE: &str = "</title>";
pub const DESCRIPTION_OPEN: &str = "<description>";
pub const DESCRIPTION_CLOSE: &str = "</description>";

/// One displayable entry: raw title, sanitized plain-text description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Default)]
enum ExtractionState {
    #[default]
    Outside,
    InItem(FeedItem),
}

impl ExtractionState {
    /// Applies one trimmed line, returning the item it completes, if any.
    fn feed_line(&mut self, line: &str) -> Option<FeedItem> {
        if line.starts_with(ITEM_OPEN) && matches!(self, ExtractionState::Outside) {
            *self = ExtractionState::InItem(FeedItem::default());
        }

        let mut finished = None;
        if line.ends_with(ITEM_CLOSE) {
            if let ExtractionState::InItem(item) = mem::take(self) {
                finished = Some(item);
            }
        }

        if let ExtractionState::InItem(item) = self {
            if line.starts_with(TITLE_OPEN) {
                item.title = field_text(line, TITLE_OPEN, TITLE_CLOSE);
            }
            if line.starts_with(DESCRIPTION_OPEN) {
                item.description = sanitize(&field_text(line, DESCRIPTION_OPEN, DESCRIPTION_CLOSE));
            }
        }

        finished
    }
}

fn field_text(line: &str, open: &str, close: &str) -> String {
    line.replace(open, "").replace(close, "")
}

/// Lazily yields completed items in document order.
#[derive(Debug)]
pub struct Items<'a> {
    lines: Lines<'a>,
    state: ExtractionState,
}

impl Iterator for Items<'_> {
    type Item = FeedItem;

    fn next(&mut self) -> Option<FeedItem> {
        for line in self.lines.by_ref() {
            if let Some(item) = self.state.feed_line(line.trim()) {
                return Some(item);
            }
        }

        if let ExtractionState::InItem(item) = mem::take(&mut self.state) {
            tracing::debug!(title = %item.title, "dropping item without close marker");
        }
        None
    }
}

/// Scans `text` for item blocks. Malformed input yields fewer items, never an error.
pub fn extract(text: &str) -> Items<'_> {
    Items {
        lines: text.lines(),
        state: ExtractionState::Outside,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, description: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn yields_complete_items_in_order() {
        let text = "\
<channel>
<title>Channel</title>
<item>
  <title>First</title>
  <description>one</description>
</item>
<item>
  <title>Second</title>
  <description>two</description>
</item>
</channel>";
        let items: Vec<_> = extract(text).collect();
        assert_eq!(items, vec![item("First", "one"), item("Second", "two")]);
    }

    #[test]
    fn unterminated_item_is_dropped() {
        let text = "<item>\n<title>kept</title>\n</item>\n<item>\n<title>lost</title>\n";
        let items: Vec<_> = extract(text).collect();
        assert_eq!(items, vec![item("kept", "")]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(extract("").count(), 0);
    }

    #[test]
    fn channel_title_outside_item_is_ignored() {
        let text = "<title>Channel</title>\n<item>\n</item>";
        let items: Vec<_> = extract(text).collect();
        assert_eq!(items, vec![item("", "")]);
    }

    #[test]
    fn title_is_kept_raw_and_description_is_sanitized() {
        let text = "\
<item>
<title><![CDATA[Raw & <b>title</b>]]></title>
<description><![CDATA[Body <b>x</b> &amp; more]]></description>
</item>";
        let items: Vec<_> = extract(text).collect();
        assert_eq!(
            items,
            vec![item("<![CDATA[Raw & <b>title</b>]]>", "Body  &amp; more")]
        );
    }

    #[test]
    fn item_open_tolerates_attributes() {
        let text = "<item rdf:about=\"https://example.com/1\">\n<title>rdf</title>\n</item>";
        let items: Vec<_> = extract(text).collect();
        assert_eq!(items, vec![item("rdf", "")]);
    }

    #[test]
    fn nested_open_marker_does_not_reset_item() {
        let text = "<item>\n<title>outer</title>\n<item>\n</item>";
        let items: Vec<_> = extract(text).collect();
        assert_eq!(items, vec![item("outer", "")]);
    }

    #[test]
    fn close_marker_outside_item_is_ignored() {
        let text = "</item>\n<item>\n<title>only</title>\n</item>";
        let items: Vec<_> = extract(text).collect();
        assert_eq!(items, vec![item("only", "")]);
    }

    #[test]
    fn one_line_item_closes_before_fields_are_read() {
        let text = "<item><title>inline</title></item>";
        let items: Vec<_> = extract(text).collect();
        assert_eq!(items, vec![item("", "")]);
    }

    #[test]
    fn multi_line_field_is_not_captured() {
        let text = "<item>\n<description>first half\nsecond half</description>\n</item>";
        let items: Vec<_> = extract(text).collect();
        assert_eq!(items, vec![item("", "first half")]);
    }

    #[test]
    fn crlf_and_indentation_are_trimmed() {
        let text = "  <item>\r\n\t<title>crlf</title>\r\n  </item>\r\n";
        let items: Vec<_> = extract(text).collect();
        assert_eq!(items, vec![item("crlf", "")]);
    }

    #[test]
    fn later_field_line_overwrites_earlier() {
        let text = "<item>\n<title>a</title>\n<title>b</title>\n</item>";
        let items: Vec<_> = extract(text).collect();
        assert_eq!(items, vec![item("b", "")]);
    }

    #[test]
    fn iteration_is_lazy_and_restartable() {
        let text = "<item>\n<title>1</title>\n</item>\n<item>\n<title>2</title>\n</item>";
        let mut items = extract(text);
        assert_eq!(items.next(), Some(item("1", "")));
        assert_eq!(extract(text).count(), 2);
        assert_eq!(items.next(), Some(item("2", "")));
        assert_eq!(items.next(), None);
    }
}
