use serde::{Deserialize, Serialize};

/// One entry of a novel's chapter list, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterInfo {
    /// 1-based chapter number.
    #[serde(rename = "chapterNumber")]
    pub number: u32,
    #[serde(rename = "chapterTitle")]
    pub title: String,
    /// Absolute link to the chapter page on the source site.
    pub link: String,
}
