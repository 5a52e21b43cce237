//! HTTP client for the loadout server.
//!
//! Routes:
//! - `GET  /list_profiles?user=`          -> `{ "profiles": [...] }`
//! - `GET  /get_profile?user=&profile=`   -> `{ "macros": [...] }`
//! - `GET  /all_profiles`                 -> `{ user: { profile: [...] } }`
//! - `POST /save_profile`                 <- `{ user, profile, macros }`
//! - `POST /rename_profile`               <- `{ user, old_profile, new_profile }`
//! - `POST /delete_profile`               <- `{ user, profile }`
//! - `GET  /trigger/<macro>?user=`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{AllProfiles, ProfileStore, SyncError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Triggers go straight to the controller; a slow reply is not worth waiting for.
const TRIGGER_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct ProfileList {
    #[serde(default)]
    profiles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileMacros {
    #[serde(default)]
    macros: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct SaveRequest<'a> {
    user: &'a str,
    profile: &'a str,
    macros: &'a [String],
}

#[derive(Debug, Serialize)]
struct RenameRequest<'a> {
    user: &'a str,
    old_profile: &'a str,
    new_profile: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    user: &'a str,
    profile: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpProfileStore {
    base: Url,
    client: reqwest::Client,
}

impl HttpProfileStore {
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| SyncError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(SyncError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent("Macrolink/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, SyncError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        parse_json(&resp.bytes().await?)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, route: &str, body: &B) -> Result<(), SyncError> {
        self.client
            .post(self.endpoint(&[route]))
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Parses a JSON body, including a short preview of the payload on failure
/// (wrong endpoints tend to answer with HTML).
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SyncError> {
    serde_json::from_slice(bytes).map_err(|e| {
        let preview = String::from_utf8_lossy(&bytes[..bytes.len().min(240)]);
        SyncError::BadResponse(format!("{e}. body preview: {preview}"))
    })
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn list_profiles(&self, user: &str) -> Result<Vec<String>, SyncError> {
        let list: ProfileList = self
            .get_json(self.endpoint(&["list_profiles"]), &[("user", user)])
            .await?;
        debug!(user, count = list.profiles.len(), "listed profiles");
        Ok(list.profiles)
    }

    async fn fetch_profile(
        &self,
        user: &str,
        profile: &str,
    ) -> Result<Option<Vec<String>>, SyncError> {
        let resp = self
            .client
            .get(self.endpoint(&["get_profile"]))
            .query(&[("user", user), ("profile", profile)])
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp.error_for_status()?;
        let body: ProfileMacros = parse_json(&resp.bytes().await?)?;
        Ok(body.macros)
    }

    async fn fetch_all(&self) -> Result<AllProfiles, SyncError> {
        self.get_json(self.endpoint(&["all_profiles"]), &[]).await
    }

    async fn save_profile(
        &self,
        user: &str,
        profile: &str,
        macros: &[String],
    ) -> Result<(), SyncError> {
        self.post_json(
            "save_profile",
            &SaveRequest {
                user,
                profile,
                macros,
            },
        )
        .await?;
        info!(user, profile, count = macros.len(), "saved profile");
        Ok(())
    }

    async fn rename_profile(&self, user: &str, old: &str, new: &str) -> Result<(), SyncError> {
        self.post_json(
            "rename_profile",
            &RenameRequest {
                user,
                old_profile: old,
                new_profile: new,
            },
        )
        .await?;
        info!(user, old, new, "renamed profile");
        Ok(())
    }

    async fn delete_profile(&self, user: &str, profile: &str) -> Result<(), SyncError> {
        self.post_json("delete_profile", &DeleteRequest { user, profile })
            .await?;
        info!(user, profile, "deleted profile");
        Ok(())
    }

    async fn trigger_macro(&self, macro_key: &str, user: &str) -> Result<(), SyncError> {
        let resp = self
            .client
            .get(self.endpoint(&["trigger", macro_key]))
            .query(&[("user", user)])
            .timeout(TRIGGER_TIMEOUT)
            .send()
            .await?;
        debug!(macro_key, status = %resp.status(), "triggered macro");
        resp.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_segments() {
        let store = HttpProfileStore::new("http://192.168.50.35:8888/").unwrap();
        assert_eq!(
            store.endpoint(&["trigger", "SOS Beacon"]).as_str(),
            "http://192.168.50.35:8888/trigger/SOS%20Beacon"
        );
        assert_eq!(
            store.endpoint(&["list_profiles"]).as_str(),
            "http://192.168.50.35:8888/list_profiles"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let store = HttpProfileStore::new("http://host/panel").unwrap();
        assert_eq!(
            store.endpoint(&["all_profiles"]).as_str(),
            "http://host/panel/all_profiles"
        );
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(
            HttpProfileStore::new("not a url"),
            Err(SyncError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpProfileStore::new("mailto:someone@example.com"),
            Err(SyncError::InvalidUrl(_))
        ));
    }

    #[test]
    fn parses_response_shapes() {
        let list: ProfileList = parse_json(br#"{"profiles": ["bugs", "bots"]}"#).unwrap();
        assert_eq!(list.profiles, ["bugs", "bots"]);

        let missing: ProfileMacros = parse_json(br#"{"error": "not found"}"#).unwrap();
        assert!(missing.macros.is_none());

        let all: AllProfiles =
            parse_json(br#"{"user1": {"bugs": ["Reinforce", "Resupply", "Railgun"]}}"#).unwrap();
        assert_eq!(all["user1"]["bugs"][2], "Railgun");
    }

    #[test]
    fn html_body_is_bad_response_with_preview() {
        let err = parse_json::<ProfileList>(b"<html>oops</html>").unwrap_err();
        match err {
            SyncError::BadResponse(msg) => assert!(msg.contains("<html>oops")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn request_bodies_match_server_fields() {
        let macros = vec!["Reinforce".to_string(), "Resupply".to_string()];
        let save = serde_json::to_value(SaveRequest {
            user: "green",
            profile: "bugs",
            macros: &macros,
        })
        .unwrap();
        assert_eq!(save["macros"][1], "Resupply");

        let rename = serde_json::to_value(RenameRequest {
            user: "green",
            old_profile: "a",
            new_profile: "b",
        })
        .unwrap();
        assert_eq!(rename["old_profile"], "a");
        assert_eq!(rename["new_profile"], "b");
    }

    #[tokio::test]
    async fn unreachable_server_is_remote_unavailable() {
        // Port 9 (discard) on localhost is closed on any sane test machine.
        let store = HttpProfileStore::new("http://127.0.0.1:9").unwrap();
        let err = store.list_profiles("green").await.unwrap_err();
        assert!(matches!(err, SyncError::RemoteUnavailable(_)));
    }
}
