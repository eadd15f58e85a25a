//! Rekordbox XML writer
//!
//! Serializes the document model using streaming XML output. Track
//! attributes and non-cue children are written back exactly as they were
//! read; only POSITION_MARK elements and the Entries/Count bookkeeping
//! attributes are regenerated.

use crate::error::{AutocueError, Result};
use crate::types::{Document, MarkKind, PlaylistKind, PlaylistNode, PositionMark, TrackRecord, XmlNode};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use super::schema::{self, attrs, elements, mark_attrs, node_attrs, node_types};

/// Write the document into `output_dir` under a timestamped file name
///
/// Creates the directory if needed and returns the path written.
pub fn export_document(document: &Document, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|e| AutocueError::output_error(output_dir, e))?;

    let path = timestamped_output_path(output_dir);
    write_document(document, &path)?;
    Ok(path)
}

/// `<dir>/autocue_YYYYMMDD_HHMMSS.xml`, local time
pub fn timestamped_output_path(output_dir: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    output_dir.join(format!("autocue_{}.xml", timestamp))
}

/// Write the document to a Rekordbox XML file
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
/// A failed export never leaves a truncated file at `output_path`.
pub fn write_document(document: &Document, output_path: &Path) -> Result<()> {
    // Same directory as the target so the rename stays on one filesystem
    let temp_path = output_path.with_extension("xml.tmp");

    let file = File::create(&temp_path).map_err(|e| AutocueError::output_error(output_path, e))?;
    let mut xml = Writer::new_with_indent(BufWriter::new(file), b' ', 2);

    let written = write_root(&mut xml, document).and_then(|()| {
        xml.into_inner()
            .flush()
            .map_err(|e| format!("Failed to flush output: {}", e))
    });

    if let Err(reason) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(AutocueError::OutputError {
            path: output_path.to_path_buf(),
            reason,
        });
    }

    // Atomic rename: either succeeds completely or fails without modifying target
    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        AutocueError::OutputError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!(
        "Wrote {} tracks to {}",
        document.tracks.len(),
        output_path.display()
    );

    Ok(())
}

type WriteResult = std::result::Result<(), String>;

fn write_root<W: Write>(xml: &mut Writer<W>, document: &Document) -> WriteResult {
    emit(
        xml,
        Event::Decl(BytesDecl::new(schema::XML_VERSION, Some(schema::XML_ENCODING), None)),
    )?;

    let mut root = BytesStart::new(elements::ROOT);
    if !document.version.is_empty() {
        root.push_attribute((attrs::VERSION, document.version.as_str()));
    }
    emit(xml, Event::Start(root))?;

    write_extras(xml, document, 0)?;

    let mut collection = BytesStart::new(elements::COLLECTION);
    collection.push_attribute((attrs::ENTRIES, document.tracks.len().to_string().as_str()));
    if document.tracks.is_empty() {
        emit(xml, Event::Empty(collection))?;
    } else {
        emit(xml, Event::Start(collection))?;
        for track in &document.tracks {
            write_track(xml, track)?;
        }
        emit(xml, Event::End(BytesEnd::new(elements::COLLECTION)))?;
    }
    write_extras(xml, document, 1)?;

    if let Some(playlists) = &document.playlists {
        emit(xml, Event::Start(BytesStart::new(elements::PLAYLISTS)))?;
        write_playlist_node(xml, playlists)?;
        emit(xml, Event::End(BytesEnd::new(elements::PLAYLISTS)))?;
    }
    write_extras(xml, document, 2)?;

    emit(xml, Event::End(BytesEnd::new(elements::ROOT)))
}

/// Write the verbatim root elements that sat after `sections_before` of
/// COLLECTION/PLAYLISTS in the source
///
/// COLLECTION is always written before PLAYLISTS, so an extra is placed by
/// how many known sections preceded it rather than by which ones.
fn write_extras<W: Write>(xml: &mut Writer<W>, document: &Document, sections_before: usize) -> WriteResult {
    for extra in &document.extras {
        if extra.sections_before.min(2) == sections_before {
            write_node(xml, &extra.node)?;
        }
    }
    Ok(())
}

/// Write a single TRACK element
fn write_track<W: Write>(xml: &mut Writer<W>, track: &TrackRecord) -> WriteResult {
    let mut elem = BytesStart::new(elements::TRACK);
    for (key, value) in &track.attributes {
        elem.push_attribute((key.as_str(), value.as_str()));
    }

    if track.children.is_empty() && track.markers.is_empty() {
        return emit(xml, Event::Empty(elem));
    }

    emit(xml, Event::Start(elem))?;
    for child in &track.children {
        write_node(xml, child)?;
    }
    for mark in &track.markers {
        write_position_mark(xml, mark)?;
    }
    emit(xml, Event::End(BytesEnd::new(elements::TRACK)))
}

fn write_position_mark<W: Write>(xml: &mut Writer<W>, mark: &PositionMark) -> WriteResult {
    let mut elem = BytesStart::new(elements::POSITION_MARK);
    elem.push_attribute((mark_attrs::NAME, mark.name.as_str()));
    elem.push_attribute((mark_attrs::TYPE, mark.mark_type.to_string().as_str()));
    elem.push_attribute((mark_attrs::START, format!("{:.3}", mark.start_seconds).as_str()));
    if let Some(end) = mark.end_seconds {
        elem.push_attribute((mark_attrs::END, format!("{:.3}", end).as_str()));
    }
    // The slot attribute is what marks a hot cue
    if let MarkKind::Primary { slot } = mark.kind {
        elem.push_attribute((mark_attrs::NUM, slot.to_string().as_str()));
    }
    if let Some(rgb) = mark.color {
        elem.push_attribute((mark_attrs::RED, rgb.r.to_string().as_str()));
        elem.push_attribute((mark_attrs::GREEN, rgb.g.to_string().as_str()));
        elem.push_attribute((mark_attrs::BLUE, rgb.b.to_string().as_str()));
    }
    emit(xml, Event::Empty(elem))
}

fn write_playlist_node<W: Write>(xml: &mut Writer<W>, node: &PlaylistNode) -> WriteResult {
    let mut elem = BytesStart::new(elements::NODE);

    match &node.kind {
        PlaylistKind::Folder(children) => {
            elem.push_attribute((node_attrs::TYPE, node_types::FOLDER));
            elem.push_attribute((node_attrs::NAME, node.name.as_str()));
            elem.push_attribute((node_attrs::COUNT, children.len().to_string().as_str()));
            if children.is_empty() {
                return emit(xml, Event::Empty(elem));
            }
            emit(xml, Event::Start(elem))?;
            for child in children {
                write_playlist_node(xml, child)?;
            }
        }
        PlaylistKind::Playlist { key_type, track_keys } => {
            elem.push_attribute((node_attrs::NAME, node.name.as_str()));
            elem.push_attribute((node_attrs::TYPE, node_types::PLAYLIST));
            elem.push_attribute((node_attrs::KEY_TYPE, key_type.as_str()));
            elem.push_attribute((node_attrs::ENTRIES, track_keys.len().to_string().as_str()));
            if track_keys.is_empty() {
                return emit(xml, Event::Empty(elem));
            }
            emit(xml, Event::Start(elem))?;
            for key in track_keys {
                let mut track_ref = BytesStart::new(elements::TRACK);
                track_ref.push_attribute((node_attrs::KEY, key.as_str()));
                emit(xml, Event::Empty(track_ref))?;
            }
        }
    }

    emit(xml, Event::End(BytesEnd::new(elements::NODE)))
}

/// Write a verbatim element and its subtree
fn write_node<W: Write>(xml: &mut Writer<W>, node: &XmlNode) -> WriteResult {
    let mut elem = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        elem.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() && node.text.is_none() {
        return emit(xml, Event::Empty(elem));
    }

    emit(xml, Event::Start(elem))?;
    if let Some(text) = &node.text {
        emit(xml, Event::Text(BytesText::new(text)))?;
    }
    for child in &node.children {
        write_node(xml, child)?;
    }
    emit(xml, Event::End(BytesEnd::new(node.name.as_str())))
}

/// Write one event, converting the writer error into a message
fn emit<W: Write>(xml: &mut Writer<W>, event: Event<'_>) -> WriteResult {
    xml.write_event(event)
        .map_err(|e| format!("XML write error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rekordbox::reader::{parse_document, read_document};
    use crate::types::Rgb;
    use tempfile::TempDir;

    const LIBRARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DJ_PLAYLISTS Version="1.0.0">
  <PRODUCT Name="rekordbox" Version="6.7.4" Company="AlphaTheta"/>
  <COLLECTION Entries="1">
    <TRACK TrackID="7" Name="Quotes &quot;&lt;&amp;&gt;" Artist="A" Kind="MP3 File" TotalTime="200" AverageBpm="124.00" Rating="255">
      <TEMPO Inizio="0.100" Bpm="124.00" Metro="4/4" Battito="1"/>
      <POSITION_MARK Name="Keep" Type="0" Start="12.500" Num="3" Red="1" Green="2" Blue="3"/>
    </TRACK>
  </COLLECTION>
  <PLAYLISTS>
    <NODE Type="0" Name="ROOT" Count="1">
      <NODE Name="Warmup" Type="1" KeyType="0" Entries="1">
        <TRACK Key="7"/>
      </NODE>
    </NODE>
  </PLAYLISTS>
</DJ_PLAYLISTS>"#;

    #[test]
    fn test_round_trip_preserves_unrelated_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xml");

        let original = parse_document(LIBRARY).unwrap();
        write_document(&original, &path).unwrap();
        let reread = read_document(&path).unwrap();

        assert_eq!(reread, original);

        let track = &reread.tracks[0];
        assert_eq!(track.name, "Quotes \"<&>");
        assert!(track.attributes.contains(&("Rating".to_string(), "255".to_string())));
        assert!(track.attributes.contains(&("Kind".to_string(), "MP3 File".to_string())));
        assert_eq!(track.children[0].attr("Battito"), Some("1"));
        assert_eq!(track.markers[0].color, Some(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn test_extras_keep_their_position() {
        let source = LIBRARY.replace(
            "</DJ_PLAYLISTS>",
            "  <VENDOR Note=\"after playlists\"/>\n</DJ_PLAYLISTS>",
        );
        let doc = parse_document(&source).unwrap();
        assert_eq!(doc.extras[1].sections_before, 2);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xml");
        write_document(&doc, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let product = content.find("<PRODUCT").unwrap();
        let collection = content.find("<COLLECTION").unwrap();
        let playlists = content.find("</PLAYLISTS>").unwrap();
        let vendor = content.find("<VENDOR").unwrap();
        assert!(product < collection);
        assert!(playlists < vendor);

        assert_eq!(read_document(&path).unwrap(), doc);
    }

    #[test]
    fn test_secondary_written_without_num() {
        let mut doc = parse_document(LIBRARY).unwrap();
        doc.tracks[0].markers.push(PositionMark {
            name: "Memory".to_string(),
            kind: MarkKind::Secondary,
            start_seconds: 60.0,
            end_seconds: None,
            mark_type: PositionMark::TYPE_CUE,
            color: None,
        });

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xml");
        write_document(&doc, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"<POSITION_MARK Name="Memory" Type="0" Start="60.000"/>"#));
        assert!(content.contains(r#"Start="12.500" Num="3""#));
        assert!(!path.with_extension("xml.tmp").exists());
    }

    #[test]
    fn test_timestamped_output_path() {
        let path = timestamped_output_path(Path::new("/tmp/out"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("autocue_"));
        assert!(name.ends_with(".xml"));
        // autocue_ + YYYYMMDD_HHMMSS + .xml
        assert_eq!(name.len(), "autocue_".len() + 15 + ".xml".len());
    }

    #[test]
    fn test_export_creates_directory() {
        let dir = TempDir::new().unwrap();
        let output_dir = dir.path().join("nested").join("exports");

        let doc = parse_document(LIBRARY).unwrap();
        let path = export_document(&doc, &output_dir).unwrap();

        assert!(path.starts_with(&output_dir));
        assert!(path.exists());
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.xml");

        let doc = parse_document(LIBRARY).unwrap();
        let err = write_document(&doc, &path).unwrap_err();
        assert!(matches!(err, AutocueError::OutputError { .. }));
    }
}
