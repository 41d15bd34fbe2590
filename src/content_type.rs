use std::fmt;

use serde::Serialize;

/// Kind of content behind a result, as the site labels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    Video,
    Tab,
    Chords,
    Bass,
    ProTab,
    PowerTab,
    Drums,
    Ukulele,
    Official,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Tab => "tab",
            ContentType::Chords => "chords",
            ContentType::Bass => "bass",
            ContentType::ProTab => "proTab",
            ContentType::PowerTab => "powerTab",
            ContentType::Drums => "drums",
            ContentType::Ukulele => "ukulele",
            ContentType::Official => "official",
        }
    }

    /// Never available as plain text, whatever the viewer version says.
    pub fn is_restricted(self) -> bool {
        matches!(
            self,
            ContentType::Official | ContentType::ProTab | ContentType::PowerTab
        )
    }

    /// Single-letter type flags used on the command line.
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'c' => Some(ContentType::Chords),
            't' => Some(ContentType::Tab),
            'u' => Some(ContentType::Ukulele),
            'b' => Some(ContentType::Bass),
            'd' => Some(ContentType::Drums),
            'v' => Some(ContentType::Video),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a site label to the taxonomy. Case and whitespace are ignored;
/// anything unknown (or no label at all) is `Official`.
pub fn classify(label: Option<&str>) -> ContentType {
    let Some(label) = label else {
        return ContentType::Official;
    };
    let key: String = label
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    match key.as_str() {
        "tab" | "tabs" => ContentType::Tab,
        "chord" | "chords" => ContentType::Chords,
        "bass" | "basstab" | "basstabs" => ContentType::Bass,
        "pro" | "protab" | "protabs" => ContentType::ProTab,
        "power" | "powertab" | "powertabs" => ContentType::PowerTab,
        "drums" | "drumtab" | "drumtabs" => ContentType::Drums,
        "ukulele" | "ukulelechords" => ContentType::Ukulele,
        "video" | "videos" => ContentType::Video,
        _ => ContentType::Official,
    }
}

/// Plain text only when the viewer version is 0 and the type is not one of
/// the restricted kinds. Either condition alone can forbid it.
pub fn is_plaintext(kind: ContentType, viewer_version: u32) -> bool {
    viewer_version == 0 && !kind.is_restricted()
}
