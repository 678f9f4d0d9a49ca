use crate::error::SourceError;
use crate::http::trim_base_url;
use crate::imdb::parser;
use crate::traits::TrailerSource;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use trailer_sync_models::ImdbId;

/// Scrapes a title's video gallery for a direct trailer URL.
///
/// Two page requests per title: the gallery (to pick a video) and the
/// video page (to read its playback URLs).
#[derive(Clone)]
pub struct ImdbTrailerSource {
    client: Client,
    base_url: String,
    start_offset_seconds: u32,
}

impl ImdbTrailerSource {
    pub fn new(client: Client, base_url: &str, start_offset_seconds: u32) -> Self {
        Self {
            client,
            base_url: trim_base_url(base_url),
            start_offset_seconds,
        }
    }

    fn gallery_url(&self, imdb_id: &ImdbId) -> String {
        format!("{}/title/{}/videogallery/?sort=date,asc", self.base_url, imdb_id)
    }

    fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }

    async fn get_page(&self, url: &str) -> Result<String, SourceError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl TrailerSource for ImdbTrailerSource {
    fn source_name(&self) -> &str {
        "imdb"
    }

    async fn fetch_trailer_url(&self, imdb_id: &ImdbId) -> Result<Option<String>, SourceError> {
        let gallery_url = self.gallery_url(imdb_id);
        let gallery = self.get_page(&gallery_url).await?;

        let Some(href) = parser::parse_gallery_video_link(&gallery)? else {
            info!(imdb_id = %imdb_id, "No video found in gallery");
            return Ok(None);
        };

        let video_page_url = self.absolute_url(&href);
        debug!(imdb_id = %imdb_id, url = %video_page_url, "Fetching video page");
        let video_page = self.get_page(&video_page_url).await?;

        match parser::parse_playback_url(&video_page)? {
            Some(url) => Ok(Some(parser::with_start_offset(&url, self.start_offset_seconds))),
            None => {
                info!(imdb_id = %imdb_id, url = %video_page_url, "Video page lists no playback URLs");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GALLERY: &str = r#"<html><body>
        <a href="/video/vi9001/?ref_=ttvg">Official Trailer</a>
    </body></html>"#;

    const VIDEO_PAGE: &str = r#"<html><body><script id="__NEXT_DATA__" type="application/json">
        {"props":{"pageProps":{"videoPlaybackData":{"video":{"playbackURLs":[
            {"url":"https://cdn/video.mp4?Expires=9999999999","videoMimeType":"MP4","videoDefinition":"DEF_1080p"}
        ]}}}}}
    </script></body></html>"#;

    fn source(server: &MockServer) -> ImdbTrailerSource {
        ImdbTrailerSource::new(Client::new(), &server.uri(), 10)
    }

    #[tokio::test]
    async fn test_fetch_follows_gallery_to_video_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/title/tt0133093/videogallery/"))
            .and(query_param("sort", "date,asc"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GALLERY))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/video/vi9001/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VIDEO_PAGE))
            .mount(&server)
            .await;

        let id = ImdbId::parse("tt0133093").unwrap();
        let url = source(&server).fetch_trailer_url(&id).await.unwrap();
        assert_eq!(url.as_deref(), Some("https://cdn/video.mp4?Expires=9999999999#t=10"));
    }

    #[tokio::test]
    async fn test_gallery_without_videos_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/title/tt0000001/videogallery/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
            .mount(&server)
            .await;

        let id = ImdbId::parse("tt0000001").unwrap();
        assert_eq!(source(&server).fetch_trailer_url(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let id = ImdbId::parse("tt0000002").unwrap();
        let err = source(&server).fetch_trailer_url(&id).await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 503, .. }));
    }
}
