//! ThingSpeak channel update, published after each fresh aggregate.

use core::fmt::Write;

use heapless::String;

use crate::data::AggregateSnapshot;

/// Worst case: every headline byte percent-encoded.
pub type PublishUrl = String<384>;

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn url_encode<W: Write>(out: &mut W, s: &str) -> core::fmt::Result {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in s.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.write_char(b as char)?;
        } else {
            out.write_char('%')?;
            out.write_char(HEX[(b >> 4) as usize] as char)?;
            out.write_char(HEX[(b & 0x0F) as usize] as char)?;
        }
    }
    Ok(())
}

/// `field1..field4` = subscribers, BTC, ETH, first headline.
pub fn update_url(base: &str, write_key: &str, agg: &AggregateSnapshot) -> Option<PublishUrl> {
    let mut url = PublishUrl::new();
    write!(
        url,
        "{base}?api_key={write_key}&field1={}&field2={:.2}&field3={:.2}&field4=",
        agg.subscriber_count, agg.btc_usd, agg.eth_usd
    )
    .ok()?;
    url_encode(&mut url, &agg.headlines[0]).ok()?;
    Some(url)
}
