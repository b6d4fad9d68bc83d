use std::{future::Future, time::Duration};

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::{debug, warn};

use crate::{config::FetcherConfig, error::FetchError};

/// How far into the body to look for an XML declaration.
const XML_DECL_SCAN_LIMIT: usize = 1024;

/// Produces the raw text of one feed. The ticker only depends on this seam.
pub trait FeedSource: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

pub struct HttpFeedSource {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl HttpFeedSource {
    pub fn new(mut config: FetcherConfig) -> anyhow::Result<Self> {
        if config.request_timeout_secs == 0 {
            config.request_timeout_secs = 10;
        }
        if config.max_attempts == 0 {
            config.max_attempts = 1;
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            max_attempts: config.max_attempts,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = response.bytes().await?;

        debug!(url, status = status.as_u16(), len = bytes.len(), "feed body received");
        Ok(decode_body(content_type.as_deref(), &bytes))
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 1;
        loop {
            match self.fetch_once(url).await {
                Ok(text) => return Ok(text),
                Err(err) if attempt < self.max_attempts => {
                    warn!(error = %err, url, attempt, "feed fetch failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) if self.max_attempts > 1 => {
                    return Err(FetchError::Exhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    })
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Decodes a feed body to text. Order: byte-order mark, `Content-Type`
/// charset, XML declaration, then a statistical guess.
pub fn decode_body(content_type: Option<&str>, bytes: &[u8]) -> String {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| content_type.and_then(charset_from_content_type))
        .or_else(|| charset_from_xml_declaration(bytes))
        .unwrap_or_else(|| guess_encoding(bytes));

    debug!(encoding = encoding.name(), "decoding feed body");
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(encoding = encoding.name(), "feed body contained malformed sequences");
    }
    text.into_owned()
}

fn charset_from_content_type(value: &str) -> Option<&'static Encoding> {
    value.split(';').skip(1).find_map(|param| {
        let (key, label) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Encoding::for_label(label.trim().trim_matches(|c| c == '"' || c == '\'').as_bytes())
    })
}

fn charset_from_xml_declaration(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(XML_DECL_SCAN_LIMIT)];
    let head = String::from_utf8_lossy(head);
    let decl_start = head.find("<?xml")?;
    let decl = &head[decl_start..];
    let decl = &decl[..decl.find("?>")?];

    let after = &decl[decl.find("encoding")? + "encoding".len()..];
    let after = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after[1..];
    let label = &value[..value.find(quote)?];
    Encoding::for_label(label.as_bytes())
}

fn guess_encoding(bytes: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{EUC_JP, SHIFT_JIS};

    #[test]
    fn header_charset_wins_over_guess() {
        let (bytes, _, _) = SHIFT_JIS.encode("<title>ニュース速報</title>");
        let text = decode_body(Some("application/rss+xml; charset=Shift_JIS"), &bytes);
        assert_eq!(text, "<title>ニュース速報</title>");
    }

    #[test]
    fn quoted_header_charset_is_accepted() {
        let (bytes, _, _) = EUC_JP.encode("天気");
        let text = decode_body(Some("text/xml; charset=\"EUC-JP\""), &bytes);
        assert_eq!(text, "天気");
    }

    #[test]
    fn xml_declaration_is_used_without_header() {
        let body = "<?xml version=\"1.0\" encoding='EUC-JP'?>\n<rss><title>科学</title></rss>";
        let (bytes, _, _) = EUC_JP.encode(body);
        assert_eq!(decode_body(Some("text/xml"), &bytes), body);
    }

    #[test]
    fn bom_overrides_declared_charset() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<rss>é</rss>".as_bytes());
        assert_eq!(decode_body(Some("text/xml; charset=ISO-8859-1"), &bytes), "<rss>é</rss>");
    }

    #[test]
    fn plain_utf8_defaults_cleanly() {
        assert_eq!(decode_body(None, "<rss>日本語</rss>".as_bytes()), "<rss>日本語</rss>");
    }

    #[test]
    fn unknown_labels_fall_through() {
        assert!(charset_from_content_type("text/xml; charset=bogus-charset").is_none());
        assert!(charset_from_xml_declaration(b"<?xml version=\"1.0\"?><rss/>").is_none());
    }

    #[test]
    fn zero_config_values_are_normalized() {
        let source = HttpFeedSource::new(FetcherConfig {
            request_timeout_secs: 0,
            max_attempts: 0,
            retry_delay_secs: 0,
            user_agent: "test".to_string(),
        })
        .expect("client builds");
        assert_eq!(source.max_attempts, 1);
    }
}
