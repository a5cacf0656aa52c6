use medcall_core::RoomTarget;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::errors::LiveKitError;

/// Response from the consultation backend's room endpoint.
#[derive(Debug, Deserialize)]
struct RoomApiResponse {
    livekit: LiveKitCredentials,
}

#[derive(Debug, Deserialize)]
struct LiveKitCredentials {
    url: String,
    token: String,
}

/// Exchanges consultation links for LiveKit connection targets.
pub struct AuthService;

impl AuthService {
    /// Resolve a consultation link into a [`RoomTarget`].
    ///
    /// `link` may be a full URL like `https://consult.example.com/abc-defg-hij`
    /// or omit the scheme.
    pub async fn resolve(link: &str, username: Option<&str>) -> Result<RoomTarget, LiveKitError> {
        let (instance, slug) = Self::parse_link(link)?;
        let api_url = Self::api_url(&instance, &slug, username);

        tracing::info!("requesting consultation token: {api_url}");

        let resp = reqwest::get(&api_url)
            .await
            .map_err(|e| LiveKitError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LiveKitError::Auth(format!(
                "consultation backend returned status {}",
                resp.status()
            )));
        }

        let data: RoomApiResponse = resp
            .json()
            .await
            .map_err(|e| LiveKitError::Auth(format!("invalid backend response: {e}")))?;

        Ok(Self::target_from(data))
    }

    /// Extract and validate the room slug from user input.
    ///
    /// Accepts a full link or a bare slug. Slugs are three lowercase letters,
    /// a dash, four, a dash, three.
    pub fn extract_slug(input: &str) -> Result<String, LiveKitError> {
        let input = input.trim().trim_end_matches('/');
        let candidate = input.rsplit('/').next().unwrap_or_default();
        let re = Regex::new(r"^[a-z]{3}-[a-z]{4}-[a-z]{3}$")
            .map_err(|e| LiveKitError::InvalidUrl(e.to_string()))?;
        if re.is_match(candidate) {
            Ok(candidate.to_string())
        } else {
            Err(LiveKitError::InvalidUrl(format!(
                "invalid room slug format: '{candidate}'"
            )))
        }
    }

    /// Split a link into `(instance, room_slug)`. The instance keeps an
    /// explicit port.
    fn parse_link(link: &str) -> Result<(String, String), LiveKitError> {
        let trimmed = link.trim().trim_end_matches('/');
        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&with_scheme)
            .map_err(|e| LiveKitError::InvalidUrl(format!("'{trimmed}': {e}")))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| LiveKitError::InvalidUrl(format!("no host in '{trimmed}'")))?;
        let instance = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let slug = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .ok_or_else(|| {
                LiveKitError::InvalidUrl(format!("expected 'instance/room-slug', got '{trimmed}'"))
            })?;

        Ok((instance, slug.to_string()))
    }

    fn api_url(instance: &str, slug: &str, username: Option<&str>) -> String {
        let mut api_url = format!("https://{instance}/api/v1.0/rooms/{slug}/");
        if let Some(name) = username {
            let encoded = urlencoding::encode(name);
            api_url.push_str(&format!("?username={encoded}"));
        }
        api_url
    }

    fn target_from(data: RoomApiResponse) -> RoomTarget {
        let url = data
            .livekit
            .url
            .replace("https://", "wss://")
            .replace("http://", "ws://");
        RoomTarget::new(url).with_token(data.livekit.token)
    }
}
