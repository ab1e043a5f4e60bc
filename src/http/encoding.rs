//! Content-Encoding negotiation.

use std::io::{self, Write};

use flate2::Compression;
use flate2::write::GzEncoder;

/// Token used in both `Accept-Encoding` and `Content-Encoding`.
pub const GZIP: &str = "gzip";

/// Whether a list of `Accept-Encoding` values names gzip.
///
/// A quality parameter of zero (`gzip;q=0`) is a refusal. Any other
/// quality counts as acceptance.
pub fn accepts_gzip(values: &[String]) -> bool {
    values.iter().any(|value| {
        let mut params = value.split(';').map(str::trim);
        params.next() == Some(GZIP) && !params.any(is_zero_quality)
    })
}

fn is_zero_quality(param: &str) -> bool {
    param
        .strip_prefix("q=")
        .and_then(|q| q.parse::<f32>().ok())
        .is_some_and(|q| q == 0.0)
}

/// Compresses a whole body into a gzip member.
pub fn gzip(body: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}
