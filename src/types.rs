//! Core data types for autocue
//!
//! These types represent the domain model and flow through the pipeline:
//! markers computed by `cues`, the owned document model filled by
//! `rekordbox::reader`, and the stored cue representation that the mutator
//! edits.

use serde::{Deserialize, Serialize};

// =============================================================================
// Musical primitives
// =============================================================================

/// Beats per bar parsed from a "N/M" time signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats_per_bar: u32,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature { beats_per_bar: 4 };

    /// Parse "N/M", falling back to 4/4 on anything malformed
    ///
    /// This is sanitization, not validation: "7" or "x/4" or "0/4" all
    /// quietly become four beats per bar.
    pub fn parse(s: &str) -> Self {
        let beats = s
            .split_once('/')
            .and_then(|(numerator, _)| numerator.trim().parse::<u32>().ok())
            .filter(|&n| n > 0);

        match beats {
            Some(beats_per_bar) => Self { beats_per_bar },
            None => Self::COMMON,
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::COMMON
    }
}

// =============================================================================
// Cues
// =============================================================================

/// Which Rekordbox cue family a marker belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueKind {
    /// Hot cue: occupies one of 8 slots, used for live triggering
    Primary,
    /// Memory cue: unbounded, used for navigation
    Secondary,
}

impl CueKind {
    pub fn display_name(self) -> &'static str {
        match self {
            CueKind::Primary => "Hot Cue",
            CueKind::Secondary => "Memory Cue",
        }
    }
}

/// 8-bit RGB triple as written to Red/Green/Blue attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The fixed cue colour palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueColor {
    Pink,
    Red,
    Orange,
    Yellow,
    Green,
    Aqua,
    Blue,
    Purple,
}

/// Name → RGB table, in Rekordbox palette order
static PALETTE: [(CueColor, &str, Rgb); 8] = [
    (CueColor::Pink, "pink", Rgb::new(222, 68, 207)),
    (CueColor::Red, "red", Rgb::new(230, 40, 40)),
    (CueColor::Orange, "orange", Rgb::new(224, 100, 27)),
    (CueColor::Yellow, "yellow", Rgb::new(195, 175, 4)),
    (CueColor::Green, "green", Rgb::new(40, 226, 20)),
    (CueColor::Aqua, "aqua", Rgb::new(16, 177, 118)),
    (CueColor::Blue, "blue", Rgb::new(48, 90, 255)),
    (CueColor::Purple, "purple", Rgb::new(170, 114, 255)),
];

impl CueColor {
    /// Look up a colour by (case-insensitive) name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        PALETTE
            .iter()
            .find(|(_, n, _)| n.eq_ignore_ascii_case(name))
            .map(|(c, _, _)| *c)
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn rgb(self) -> Rgb {
        self.entry().2
    }

    fn entry(self) -> &'static (CueColor, &'static str, Rgb) {
        // PALETTE rows follow variant declaration order
        &PALETTE[self as usize]
    }
}

/// A computed cue position, not yet written to any track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Absolute position in milliseconds
    pub time_ms: f64,
    pub kind: CueKind,
    pub label: String,
    pub color: CueColor,
}

/// Ordered (ascending by time) list of markers for one track
pub type MarkerSet = Vec<Marker>;

// =============================================================================
// Stored cues (POSITION_MARK)
// =============================================================================

/// Tagged form of the "has a Num attribute" convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// Hot cue in slot 0-7
    Primary { slot: u8 },
    /// Memory cue (no slot)
    Secondary,
}

impl MarkKind {
    pub fn is_primary(self) -> bool {
        matches!(self, MarkKind::Primary { .. })
    }

    pub fn slot(self) -> Option<u8> {
        match self {
            MarkKind::Primary { slot } => Some(slot),
            MarkKind::Secondary => None,
        }
    }

    pub fn cue_kind(self) -> CueKind {
        match self {
            MarkKind::Primary { .. } => CueKind::Primary,
            MarkKind::Secondary => CueKind::Secondary,
        }
    }
}

/// A cue stored on a track
#[derive(Debug, Clone, PartialEq)]
pub struct PositionMark {
    pub name: String,
    pub kind: MarkKind,
    /// Start position in seconds
    pub start_seconds: f64,
    /// Loop end in seconds (loops only)
    pub end_seconds: Option<f64>,
    /// Rekordbox Type attribute: 0 = cue, 4 = loop
    pub mark_type: u8,
    pub color: Option<Rgb>,
}

impl PositionMark {
    /// Rekordbox Type for a plain cue point
    pub const TYPE_CUE: u8 = 0;

    pub fn start_ms(&self) -> f64 {
        self.start_seconds * 1000.0
    }
}

// =============================================================================
// Document model
// =============================================================================

/// An XML element kept verbatim (TEMPO, PRODUCT, unknown vendor nodes)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub text: Option<String>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// One COLLECTION/TRACK entry
///
/// `attributes` holds every attribute as read, in order, and is what gets
/// written back; the typed fields are parsed views for calculation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    pub artist: String,
    /// AverageBpm (0.0 when missing or malformed)
    pub tempo: f64,
    /// TotalTime converted to milliseconds (0 when missing or malformed)
    pub duration_ms: f64,
    /// Raw Location URI
    pub location: String,
    pub attributes: Vec<(String, String)>,
    pub markers: Vec<PositionMark>,
    /// Non-cue child elements such as TEMPO
    pub children: Vec<XmlNode>,
}

impl TrackRecord {
    /// Display string for logs ("Artist - Name", or the id when both are empty)
    pub fn display_name(&self) -> String {
        match (self.artist.is_empty(), self.name.is_empty()) {
            (false, false) => format!("{} - {}", self.artist, self.name),
            (true, false) => self.name.clone(),
            _ => format!("Track {}", self.id),
        }
    }

    /// Occupied hot cue slots
    pub fn used_slots(&self) -> impl Iterator<Item = u8> + '_ {
        self.markers.iter().filter_map(|m| m.kind.slot())
    }
}

/// PLAYLISTS tree node
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistNode {
    pub name: String,
    pub kind: PlaylistKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistKind {
    Folder(Vec<PlaylistNode>),
    Playlist {
        /// 0 = entries keyed by TrackID, 1 = keyed by Location
        key_type: String,
        track_keys: Vec<String>,
    },
}

impl PlaylistNode {
    /// Depth-first search for a playlist (not folder) by name
    pub fn find(&self, name: &str) -> Option<&PlaylistNode> {
        match &self.kind {
            PlaylistKind::Playlist { .. } if self.name == name => Some(self),
            PlaylistKind::Playlist { .. } => None,
            PlaylistKind::Folder(children) => children.iter().find_map(|c| c.find(name)),
        }
    }

    /// All playlists (not folders) below this node, depth-first
    pub fn playlists(&self) -> Vec<&PlaylistNode> {
        let mut out = Vec::new();
        self.collect_playlists(&mut out);
        out
    }

    fn collect_playlists<'a>(&'a self, out: &mut Vec<&'a PlaylistNode>) {
        match &self.kind {
            PlaylistKind::Playlist { .. } => out.push(self),
            PlaylistKind::Folder(children) => {
                for child in children {
                    child.collect_playlists(out);
                }
            }
        }
    }

    pub fn track_keys(&self) -> &[String] {
        match &self.kind {
            PlaylistKind::Playlist { track_keys, .. } => track_keys,
            PlaylistKind::Folder(_) => &[],
        }
    }
}

/// A root element kept verbatim, with its place among the known sections
#[derive(Debug, Clone, PartialEq)]
pub struct RootExtra {
    /// How many of COLLECTION and PLAYLISTS came before it (0, 1 or 2)
    pub sections_before: usize,
    pub node: XmlNode,
}

/// A parsed Rekordbox library export
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// DJ_PLAYLISTS Version attribute
    pub version: String,
    /// Root children other than COLLECTION and PLAYLISTS (PRODUCT, ...)
    pub extras: Vec<RootExtra>,
    pub tracks: Vec<TrackRecord>,
    /// The ROOT folder of the PLAYLISTS section
    pub playlists: Option<PlaylistNode>,
}

impl Document {
    pub fn find_track(&self, id: &str) -> Option<&TrackRecord> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn find_track_mut(&mut self, id: &str) -> Option<&mut TrackRecord> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn playlist(&self, name: &str) -> Option<&PlaylistNode> {
        self.playlists.as_ref().and_then(|root| root.find(name))
    }

    pub fn playlist_names(&self) -> Vec<&str> {
        self.playlists
            .as_ref()
            .map(|root| root.playlists().iter().map(|p| p.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Tracks of a playlist, in playlist order, skipping dangling keys
    ///
    /// Returns an empty list when the playlist does not exist.
    pub fn playlist_tracks(&self, name: &str) -> Vec<&TrackRecord> {
        let Some(playlist) = self.playlist(name) else {
            return Vec::new();
        };
        let by_location = matches!(
            &playlist.kind,
            PlaylistKind::Playlist { key_type, .. } if key_type == "1"
        );

        playlist
            .track_keys()
            .iter()
            .filter_map(|key| {
                if by_location {
                    self.tracks.iter().find(|t| &t.location == key)
                } else {
                    self.find_track(key)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_signature_parse() {
        assert_eq!(TimeSignature::parse("4/4").beats_per_bar, 4);
        assert_eq!(TimeSignature::parse("3/4").beats_per_bar, 3);
        assert_eq!(TimeSignature::parse(" 7 /8").beats_per_bar, 7);
    }

    #[test]
    fn test_time_signature_fallback() {
        assert_eq!(TimeSignature::parse("").beats_per_bar, 4);
        assert_eq!(TimeSignature::parse("waltz").beats_per_bar, 4);
        assert_eq!(TimeSignature::parse("x/4").beats_per_bar, 4);
        assert_eq!(TimeSignature::parse("0/4").beats_per_bar, 4);
        assert_eq!(TimeSignature::parse("3").beats_per_bar, 4);
    }

    #[test]
    fn test_palette_lookup() {
        assert_eq!(CueColor::from_name("red"), Some(CueColor::Red));
        assert_eq!(CueColor::from_name("AQUA"), Some(CueColor::Aqua));
        assert_eq!(CueColor::from_name("white"), None);

        for (color, name, rgb) in PALETTE.iter() {
            assert_eq!(color.name(), *name);
            assert_eq!(color.rgb(), *rgb);
        }
    }

    #[test]
    fn test_mark_kind_slot() {
        assert_eq!(MarkKind::Primary { slot: 3 }.slot(), Some(3));
        assert_eq!(MarkKind::Secondary.slot(), None);
        assert!(MarkKind::Primary { slot: 0 }.is_primary());
        assert_eq!(MarkKind::Secondary.cue_kind(), CueKind::Secondary);
    }

    fn playlist(name: &str, keys: &[&str]) -> PlaylistNode {
        PlaylistNode {
            name: name.to_string(),
            kind: PlaylistKind::Playlist {
                key_type: "0".to_string(),
                track_keys: keys.iter().map(|k| k.to_string()).collect(),
            },
        }
    }

    #[test]
    fn test_playlist_tracks_skip_dangling_keys() {
        let doc = Document {
            tracks: vec![
                TrackRecord {
                    id: "1".into(),
                    ..Default::default()
                },
                TrackRecord {
                    id: "2".into(),
                    ..Default::default()
                },
            ],
            playlists: Some(PlaylistNode {
                name: "ROOT".into(),
                kind: PlaylistKind::Folder(vec![PlaylistNode {
                    name: "Sets".into(),
                    kind: PlaylistKind::Folder(vec![playlist("Peak", &["2", "99", "1"])]),
                }]),
            }),
            ..Default::default()
        };

        let tracks = doc.playlist_tracks("Peak");
        let ids: Vec<_> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert!(doc.playlist_tracks("Missing").is_empty());
        assert!(doc.playlist_tracks("Sets").is_empty());
        assert_eq!(doc.playlist_names(), vec!["Peak"]);
    }

    #[test]
    fn test_display_name() {
        let mut track = TrackRecord {
            id: "7".into(),
            ..Default::default()
        };
        assert_eq!(track.display_name(), "Track 7");
        track.name = "Anthem".into();
        assert_eq!(track.display_name(), "Anthem");
        track.artist = "DJ".into();
        assert_eq!(track.display_name(), "DJ - Anthem");
    }
}
