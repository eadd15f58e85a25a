//! Rekordbox XML reader
//!
//! Parses a library export into the owned document model. Missing or
//! malformed numeric attributes become 0 instead of failing the load, since
//! real exports regularly carry empty `AverageBpm`/`TotalTime` values.

use crate::error::{AutocueError, Result};
use crate::types::{
    Document, MarkKind, PlaylistKind, PlaylistNode, PositionMark, Rgb, RootExtra, TrackRecord,
    XmlNode,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use tracing::{debug, info, warn};

use super::schema::{attrs, elements, mark_attrs, node_attrs, node_types, MEMORY_CUE_NUM};

/// Read and parse a Rekordbox XML file
pub fn read_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(AutocueError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| AutocueError::parse_error(path, e))?;
    let document = build_document(&content).map_err(|reason| AutocueError::parse_error(path, reason))?;

    info!(
        "Loaded {} tracks and {} playlists from {}",
        document.tracks.len(),
        document.playlist_names().len(),
        path.display()
    );

    Ok(document)
}

/// Parse a Rekordbox XML document from a string
pub fn parse_document(xml: &str) -> Result<Document> {
    build_document(xml).map_err(|reason| AutocueError::parse_error("<string>", reason))
}

fn build_document(xml: &str) -> std::result::Result<Document, String> {
    let root = parse_tree(xml)?;
    if root.name != elements::ROOT {
        return Err(format!(
            "expected <{}> root element, found <{}>",
            elements::ROOT,
            root.name
        ));
    }

    let mut document = Document {
        version: root.attr(attrs::VERSION).unwrap_or_default().to_string(),
        ..Default::default()
    };

    let mut sections_before = 0;
    for child in root.children {
        match child.name.as_str() {
            elements::COLLECTION => {
                sections_before += 1;
                document.tracks = child
                    .children
                    .into_iter()
                    .filter(|n| n.name == elements::TRACK)
                    .map(track_record)
                    .collect();
            }
            elements::PLAYLISTS => {
                sections_before += 1;
                document.playlists = child
                    .children
                    .into_iter()
                    .find(|n| n.name == elements::NODE)
                    .map(playlist_node);
            }
            _ => document.extras.push(RootExtra {
                sections_before,
                node: child,
            }),
        }
    }

    Ok(document)
}

/// Build a generic element tree from the XML text
fn parse_tree(xml: &str) -> std::result::Result<XmlNode, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(element(&e)?),
            Ok(Event::Empty(e)) => {
                let node = element(&e)?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                let node = stack.pop().ok_or("unexpected closing tag")?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                if let Some(parent) = stack.last_mut() {
                    parent.text.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&c);
                    parent.text.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            // Declaration, comments, processing instructions, doctype
            Ok(_) => {}
            Err(e) => {
                return Err(format!("at byte {}: {}", reader.buffer_position(), e));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unexpected end of file inside <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn element(e: &BytesStart) -> std::result::Result<XmlNode, String> {
    let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(format!("multiple root elements (second is <{}>)", node.name)),
    }
    Ok(())
}

/// Parse a number, treating missing/malformed/non-finite values as 0
fn number(node: &XmlNode, key: &str) -> f64 {
    node.attr(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn track_record(node: XmlNode) -> TrackRecord {
    let text = |key: &str| node.attr(key).unwrap_or_default().to_string();

    let mut track = TrackRecord {
        id: text(attrs::TRACK_ID),
        name: text(attrs::NAME),
        artist: text(attrs::ARTIST),
        tempo: number(&node, attrs::AVERAGE_BPM),
        duration_ms: (number(&node, attrs::TOTAL_TIME) * 1000.0).trunc(),
        location: text(attrs::LOCATION),
        ..Default::default()
    };

    if track.id.is_empty() {
        warn!("TRACK without TrackID (Name='{}'), it cannot receive cues", track.name);
    }

    for child in node.children {
        if child.name == elements::POSITION_MARK {
            track.markers.push(position_mark(&child));
        } else {
            track.children.push(child);
        }
    }
    track.attributes = node.attributes;

    debug!(
        "Track {}: {} ({:.2} BPM, {:.0}ms, {} cues)",
        track.id,
        track.display_name(),
        track.tempo,
        track.duration_ms,
        track.markers.len()
    );

    track
}

fn position_mark(node: &XmlNode) -> PositionMark {
    // A Num of 0-255 marks a hot cue; absent, -1 or garbage is a memory cue
    let kind = match node.attr(mark_attrs::NUM).map(|v| v.trim().parse::<i32>()) {
        Some(Ok(num)) if num != MEMORY_CUE_NUM => match u8::try_from(num) {
            Ok(slot) => MarkKind::Primary { slot },
            Err(_) => MarkKind::Secondary,
        },
        _ => MarkKind::Secondary,
    };

    let channel = |key: &str| node.attr(key).and_then(|v| v.trim().parse::<u8>().ok());
    let color = match (
        channel(mark_attrs::RED),
        channel(mark_attrs::GREEN),
        channel(mark_attrs::BLUE),
    ) {
        (Some(r), Some(g), Some(b)) => Some(Rgb::new(r, g, b)),
        _ => None,
    };

    PositionMark {
        name: node.attr(mark_attrs::NAME).unwrap_or_default().to_string(),
        kind,
        start_seconds: number(node, mark_attrs::START),
        end_seconds: node.attr(mark_attrs::END).map(|_| number(node, mark_attrs::END)),
        mark_type: node
            .attr(mark_attrs::TYPE)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(PositionMark::TYPE_CUE),
        color,
    }
}

fn playlist_node(node: XmlNode) -> PlaylistNode {
    let name = node.attr(node_attrs::NAME).unwrap_or_default().to_string();

    let kind = if node.attr(node_attrs::TYPE) == Some(node_types::PLAYLIST) {
        PlaylistKind::Playlist {
            key_type: node.attr(node_attrs::KEY_TYPE).unwrap_or("0").to_string(),
            track_keys: node
                .children
                .iter()
                .filter(|c| c.name == elements::TRACK)
                .filter_map(|c| c.attr(node_attrs::KEY))
                .map(str::to_string)
                .collect(),
        }
    } else {
        PlaylistKind::Folder(
            node.children
                .into_iter()
                .filter(|c| c.name == elements::NODE)
                .map(playlist_node)
                .collect(),
        )
    };

    PlaylistNode { name, kind }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DJ_PLAYLISTS Version="1.0.0">
  <PRODUCT Name="rekordbox" Version="6.7.4" Company="AlphaTheta"/>
  <COLLECTION Entries="2">
    <TRACK TrackID="101" Name="Rise &amp; Fall" Artist="Someone" TotalTime="180" AverageBpm="128.00" Location="file://localhost/Music/rise.mp3">
      <TEMPO Inizio="0.025" Bpm="128.00" Metro="4/4" Battito="1"/>
      <POSITION_MARK Name="" Type="0" Start="0.025" Num="-1"/>
      <POSITION_MARK Name="Intro" Type="0" Start="15.025" Num="0" Red="40" Green="226" Blue="20"/>
      <POSITION_MARK Name="Loop" Type="4" Start="30.0" End="37.5" Num="1"/>
    </TRACK>
    <TRACK TrackID="102" Name="Broken" AverageBpm="" TotalTime="abc"/>
  </COLLECTION>
  <PLAYLISTS>
    <NODE Type="0" Name="ROOT" Count="1">
      <NODE Type="0" Name="Sets" Count="1">
        <NODE Name="Friday" Type="1" KeyType="0" Entries="2">
          <TRACK Key="102"/>
          <TRACK Key="101"/>
        </NODE>
      </NODE>
    </NODE>
  </PLAYLISTS>
</DJ_PLAYLISTS>"#;

    #[test]
    fn test_parse_tracks() {
        let doc = parse_document(LIBRARY).unwrap();
        assert_eq!(doc.version, "1.0.0");
        assert_eq!(doc.tracks.len(), 2);

        let track = doc.find_track("101").unwrap();
        assert_eq!(track.name, "Rise & Fall");
        assert_eq!(track.artist, "Someone");
        assert_eq!(track.tempo, 128.0);
        assert_eq!(track.duration_ms, 180_000.0);
        assert_eq!(track.location, "file://localhost/Music/rise.mp3");
        assert_eq!(track.children.len(), 1);
        assert_eq!(track.children[0].name, "TEMPO");
    }

    #[test]
    fn test_malformed_numbers_default_to_zero() {
        let doc = parse_document(LIBRARY).unwrap();
        let track = doc.find_track("102").unwrap();
        assert_eq!(track.tempo, 0.0);
        assert_eq!(track.duration_ms, 0.0);
        assert!(track.artist.is_empty());
    }

    #[test]
    fn test_parse_position_marks() {
        let doc = parse_document(LIBRARY).unwrap();
        let marks = &doc.find_track("101").unwrap().markers;
        assert_eq!(marks.len(), 3);

        assert_eq!(marks[0].kind, MarkKind::Secondary);
        assert_eq!(marks[0].color, None);

        assert_eq!(marks[1].kind, MarkKind::Primary { slot: 0 });
        assert_eq!(marks[1].name, "Intro");
        assert_eq!(marks[1].start_seconds, 15.025);
        assert_eq!(marks[1].color, Some(Rgb::new(40, 226, 20)));

        assert_eq!(marks[2].kind, MarkKind::Primary { slot: 1 });
        assert_eq!(marks[2].mark_type, 4);
        assert_eq!(marks[2].end_seconds, Some(37.5));
    }

    #[test]
    fn test_parse_playlists() {
        let doc = parse_document(LIBRARY).unwrap();
        assert_eq!(doc.playlist_names(), vec!["Friday"]);

        let ids: Vec<_> = doc
            .playlist_tracks("Friday")
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(ids, vec!["102", "101"]);
    }

    #[test]
    fn test_extras_preserved() {
        let doc = parse_document(LIBRARY).unwrap();
        assert_eq!(doc.extras.len(), 1);
        assert_eq!(doc.extras[0].sections_before, 0);
        assert_eq!(doc.extras[0].node.name, "PRODUCT");
        assert_eq!(doc.extras[0].node.attr("Company"), Some("AlphaTheta"));
    }

    #[test]
    fn test_rejects_wrong_root() {
        let err = parse_document("<LIBRARY/>").unwrap_err();
        assert!(matches!(err, AutocueError::ParseError { .. }));
    }

    #[test]
    fn test_rejects_malformed_xml() {
        assert!(parse_document("<DJ_PLAYLISTS><COLLECTION></DJ_PLAYLISTS>").is_err());
        assert!(parse_document("<DJ_PLAYLISTS>").is_err());
        assert!(parse_document("").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = read_document(Path::new("/nonexistent/rekordbox.xml")).unwrap_err();
        assert!(matches!(err, AutocueError::FileNotFound(_)));
    }
}
