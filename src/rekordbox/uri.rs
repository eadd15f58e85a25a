//! Decoding of the Rekordbox Location attribute
//!
//! Rekordbox stores paths as percent-encoded URIs:
//! - Windows: file://localhost/C:/Music/Track.mp3 → C:/Music/Track.mp3
//! - macOS/Linux: file://localhost/Users/DJ/My%20Music/Track.mp3 → /Users/DJ/My Music/Track.mp3
//!
//! Some third-party exporters write `file:///...` instead; both are accepted.

use percent_encoding::percent_decode_str;
use std::path::PathBuf;

use crate::types::Document;

const URI_PREFIXES: [&str; 2] = ["file://localhost/", "file:///"];

/// Convert a Rekordbox Location URI back to a filesystem path
///
/// Returns `None` for an empty location.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use autocue::rekordbox::uri::location_to_path;
///
/// assert_eq!(
///     location_to_path("file://localhost/Users/DJ/My%20Music/Track.mp3"),
///     Some(PathBuf::from("/Users/DJ/My Music/Track.mp3"))
/// );
/// ```
pub fn location_to_path(location: &str) -> Option<PathBuf> {
    let location = location.trim();
    if location.is_empty() {
        return None;
    }

    let stripped = URI_PREFIXES
        .iter()
        .find_map(|prefix| location.strip_prefix(prefix));

    let decoded = match stripped {
        Some(rest) => {
            let rest = percent_decode_str(rest).decode_utf8_lossy();
            // Drive-letter paths stay relative to the drive; everything else is rooted
            if is_windows_path(&rest) {
                rest.into_owned()
            } else {
                format!("/{}", rest)
            }
        }
        None => percent_decode_str(location).decode_utf8_lossy().into_owned(),
    };

    Some(PathBuf::from(decoded))
}

/// Check if a path string starts with a drive letter ("C:")
fn is_windows_path(path: &str) -> bool {
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}

impl Document {
    /// Filesystem path of a track's audio file, if the track exists and has a Location
    pub fn track_audio_path(&self, id: &str) -> Option<PathBuf> {
        self.find_track(id)
            .and_then(|track| location_to_path(&track.location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackRecord;

    #[test]
    fn test_unix_path() {
        assert_eq!(
            location_to_path("file://localhost/Users/DJ/Music/Track.mp3"),
            Some(PathBuf::from("/Users/DJ/Music/Track.mp3"))
        );
    }

    #[test]
    fn test_triple_slash_form() {
        assert_eq!(
            location_to_path("file:///home/dj/track.flac"),
            Some(PathBuf::from("/home/dj/track.flac"))
        );
    }

    #[test]
    fn test_windows_path() {
        assert_eq!(
            location_to_path("file://localhost/C:/Music/Track.mp3"),
            Some(PathBuf::from("C:/Music/Track.mp3"))
        );
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            location_to_path("file://localhost/Music/%5B2024%5D%20Album%20%26%20More/Caf%C3%A9.mp3"),
            Some(PathBuf::from("/Music/[2024] Album & More/Café.mp3"))
        );
    }

    #[test]
    fn test_empty_location() {
        assert_eq!(location_to_path(""), None);
        assert_eq!(location_to_path("   "), None);
    }

    #[test]
    fn test_is_windows_path() {
        assert!(is_windows_path("C:/Music/Track.mp3"));
        assert!(is_windows_path("D:/"));
        assert!(!is_windows_path("/Users/DJ"));
        assert!(!is_windows_path("relative/path"));
    }

    #[test]
    fn test_track_audio_path() {
        let doc = Document {
            tracks: vec![TrackRecord {
                id: "5".into(),
                location: "file://localhost/music/a%20b.wav".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(doc.track_audio_path("5"), Some(PathBuf::from("/music/a b.wav")));
        assert_eq!(doc.track_audio_path("6"), None);
    }
}
