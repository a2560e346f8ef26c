// RunShape - platform/fs.rs
//
// Input document reading. Pages are decoded lossily: a stray invalid byte
// in a saved page must not cost the whole extraction.

use std::io::{self, Read};
use std::path::Path;

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read everything from `reader` as a string, lossily.
///
/// Stops after `limit + 1` bytes so an oversized stream is detected without
/// buffering all of it. The returned byte count is the number read, which
/// exceeds `limit` only when the stream was too large.
pub fn read_stream_lossy<R: Read>(reader: R, limit: usize) -> io::Result<(String, usize)> {
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1) as u64)
        .read_to_end(&mut bytes)?;
    let read = bytes.len();
    Ok((String::from_utf8_lossy(&bytes).into_owned(), read))
}

/// Size of the file at `path` in bytes.
pub fn file_size(path: &Path) -> io::Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_file_lossy_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, b"<p>13:13 \xff</p>").unwrap();
        let text = read_file_lossy(&path).unwrap();
        assert!(text.starts_with("<p>13:13 "));
        assert!(text.contains('\u{fffd}'));
    }

    #[test]
    fn test_read_stream_stops_past_limit() {
        let data = vec![b'a'; 100];
        let (text, read) = read_stream_lossy(&data[..], 10).unwrap();
        assert_eq!(read, 11);
        assert_eq!(text.len(), 11);

        let (text, read) = read_stream_lossy(&data[..], 1000).unwrap();
        assert_eq!(read, 100);
        assert_eq!(text.len(), 100);
    }

    #[test]
    fn test_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x");
        std::fs::write(&path, "12345").unwrap();
        assert_eq!(file_size(&path).unwrap(), 5);
    }
}
