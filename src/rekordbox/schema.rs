//! Rekordbox XML schema constants

/// XML version declaration
pub const XML_VERSION: &str = "1.0";

/// XML encoding
pub const XML_ENCODING: &str = "UTF-8";

/// Element names
pub mod elements {
    pub const ROOT: &str = "DJ_PLAYLISTS";
    pub const COLLECTION: &str = "COLLECTION";
    pub const TRACK: &str = "TRACK";
    pub const POSITION_MARK: &str = "POSITION_MARK";
    pub const PLAYLISTS: &str = "PLAYLISTS";
    pub const NODE: &str = "NODE";
}

/// Rekordbox track attribute names
pub mod attrs {
    pub const VERSION: &str = "Version";
    pub const ENTRIES: &str = "Entries";
    pub const TRACK_ID: &str = "TrackID";
    pub const NAME: &str = "Name";
    pub const ARTIST: &str = "Artist";
    pub const LOCATION: &str = "Location";
    pub const TOTAL_TIME: &str = "TotalTime";
    pub const AVERAGE_BPM: &str = "AverageBpm";
}

/// POSITION_MARK attribute names
pub mod mark_attrs {
    pub const NAME: &str = "Name";
    pub const TYPE: &str = "Type";
    pub const START: &str = "Start";
    pub const END: &str = "End";
    /// Hot cue slot; absent (or -1) on memory cues
    pub const NUM: &str = "Num";
    pub const RED: &str = "Red";
    pub const GREEN: &str = "Green";
    pub const BLUE: &str = "Blue";
}

/// PLAYLISTS NODE attribute names
pub mod node_attrs {
    pub const TYPE: &str = "Type";
    pub const NAME: &str = "Name";
    pub const COUNT: &str = "Count";
    pub const KEY_TYPE: &str = "KeyType";
    pub const ENTRIES: &str = "Entries";
    /// Attribute of a playlist's TRACK entry
    pub const KEY: &str = "Key";
}

/// Playlist node types
pub mod node_types {
    /// Folder type (ROOT is a folder)
    pub const FOLDER: &str = "0";
    /// Playlist type
    pub const PLAYLIST: &str = "1";
}

/// Num value Rekordbox writes on memory cues
pub const MEMORY_CUE_NUM: i32 = -1;
