use crate::error::SourceError;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;

const NEXT_DATA_SELECTOR: &str = r#"script#__NEXT_DATA__[type="application/json"]"#;
const VIDEO_LINK_SELECTOR: &str = r#"a[href*="/video/vi"]"#;
const PLAYBACK_URLS_POINTER: &str = "/props/pageProps/videoPlaybackData/video/playbackURLs";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaybackEntry {
    url: Option<String>,
    #[serde(default)]
    video_mime_type: Option<String>,
    #[serde(default)]
    video_definition: Option<String>,
}

impl PlaybackEntry {
    fn is_mp4(&self) -> bool {
        self.video_mime_type.as_deref() == Some("MP4")
    }

    fn quality_rank(&self) -> u8 {
        let definition = self.video_definition.as_deref().unwrap_or("");
        if definition.contains("1080") {
            3
        } else if definition.contains("720") {
            2
        } else if definition.contains("480") {
            1
        } else {
            0
        }
    }
}

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::parse(format!("invalid selector {}: {}", css, e)))
}

/// Pick the video page link from a title's video gallery.
///
/// Prefers the first link whose text mentions a trailer, otherwise the
/// first video link. Returns the raw `href`.
pub fn parse_gallery_video_link(html: &str) -> Result<Option<String>, SourceError> {
    let document = Html::parse_document(html);
    let link_selector = selector(VIDEO_LINK_SELECTOR)?;

    let links: Vec<(String, String)> = document
        .select(&link_selector)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            if !is_video_href(href) {
                return None;
            }
            let text = link.text().collect::<String>().trim().to_lowercase();
            Some((href.to_string(), text))
        })
        .collect();

    debug!("Video gallery contains {} video link(s)", links.len());

    let chosen = links
        .iter()
        .find(|(_, text)| text.contains("trailer"))
        .or_else(|| links.first())
        .map(|(href, _)| href.clone());

    Ok(chosen)
}

/// `/video/vi<digits>` somewhere in the link.
fn is_video_href(href: &str) -> bool {
    href.match_indices("/video/vi").any(|(idx, needle)| {
        href[idx + needle.len()..]
            .chars()
            .next()
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false)
    })
}

/// Extract the best direct playback URL from a video page.
///
/// Errors when the embedded data block is missing or malformed; returns
/// `None` when the block is present but lists no playback entries.
pub fn parse_playback_url(html: &str) -> Result<Option<String>, SourceError> {
    let document = Html::parse_document(html);
    let script_selector = selector(NEXT_DATA_SELECTOR)?;

    let script = document
        .select(&script_selector)
        .next()
        .ok_or_else(|| SourceError::parse("no __NEXT_DATA__ block on video page"))?;
    let raw_json = script.text().collect::<String>();

    let data: serde_json::Value = serde_json::from_str(&raw_json)
        .map_err(|e| SourceError::parse(format!("invalid __NEXT_DATA__ JSON: {}", e)))?;
    let playback_urls = data
        .pointer(PLAYBACK_URLS_POINTER)
        .cloned()
        .ok_or_else(|| SourceError::parse("__NEXT_DATA__ has no playbackURLs"))?;
    let entries: Vec<PlaybackEntry> = serde_json::from_value(playback_urls)
        .map_err(|e| SourceError::parse(format!("unexpected playbackURLs shape: {}", e)))?;

    Ok(select_best_playback(&entries))
}

fn select_best_playback(entries: &[PlaybackEntry]) -> Option<String> {
    let mut best: Option<&PlaybackEntry> = None;
    for entry in entries.iter().filter(|e| e.is_mp4() && e.url.is_some()) {
        // Keep the first entry among equal ranks
        if best.map_or(true, |b| entry.quality_rank() > b.quality_rank()) {
            best = Some(entry);
        }
    }

    best.or_else(|| entries.iter().find(|e| e.url.is_some()))
        .and_then(|entry| entry.url.clone())
}

/// Append the playback-start fragment to a direct video URL.
pub fn with_start_offset(url: &str, start_offset_seconds: u32) -> String {
    format!("{}#t={}", url, start_offset_seconds)
}
