use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::http::HttpClient;

/// Name shown when a school or sport lookup fails. Sports share the school wording.
pub const UNKNOWN_NAME: &str = "Unknown School";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    School,
    Sport,
}

impl EntityKind {
    fn path_segment(self) -> &'static str {
        match self {
            EntityKind::School => "schools",
            EntityKind::Sport => "sports",
        }
    }

    // Schools publish a crest under `images`, sports an icon under `icon`.
    fn icon_key(self) -> &'static str {
        match self {
            EntityKind::School => "images",
            EntityKind::Sport => "icon",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::School => "school",
            EntityKind::Sport => "sport",
        })
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "school" | "schools" => Ok(EntityKind::School),
            "sport" | "sports" => Ok(EntityKind::Sport),
            other => Err(format!("unknown entity kind: {other}")),
        }
    }
}

/// Display name and tiny icon URL of a school or sport. Empty `icon_url` means none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub name: String,
    pub icon_url: String,
}

#[derive(Clone)]
pub struct EntityResolver {
    http: HttpClient,
    base_url: String,
}

impl EntityResolver {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub fn entity_url(&self, kind: EntityKind, id: u64) -> String {
        format!("{}/{}/{}", self.base_url, kind.path_segment(), id)
    }

    pub async fn resolve(&self, kind: EntityKind, id: u64) -> FetchResult<Entity> {
        let url = self.entity_url(kind, id);
        let body = self.http.fetch_json(&url).await?;
        let entity = entity_from_json(kind, &body)?;
        debug!(%kind, id, name = %entity.name, "resolved entity");
        Ok(entity)
    }
}

/// A missing name is an error; a missing icon is not.
pub(crate) fn entity_from_json(kind: EntityKind, body: &Value) -> FetchResult<Entity> {
    let name = body
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| FetchError::malformed(format!("{kind} payload has no name")))?;
    let icon_url = body
        .get(kind.icon_key())
        .and_then(|icons| icons.get("tiny"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    Ok(Entity { name: name.to_string(), icon_url: icon_url.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn school_reads_images_tiny() {
        let e = entity_from_json(
            EntityKind::School,
            &json!({"name": "Arizona", "images": {"tiny": "http://img/az.png", "small": "x"}}),
        )
        .unwrap();
        assert_eq!(e, Entity { name: "Arizona".into(), icon_url: "http://img/az.png".into() });
    }

    #[test]
    fn sport_reads_icon_tiny_not_images() {
        let body = json!({"name": "Soccer", "images": {"tiny": "wrong"}, "icon": {"tiny": "http://img/soccer.png"}});
        assert_eq!(entity_from_json(EntityKind::Sport, &body).unwrap().icon_url, "http://img/soccer.png");
    }

    #[test]
    fn missing_icon_is_tolerated() {
        let e = entity_from_json(EntityKind::Sport, &json!({"name": "Rowing"})).unwrap();
        assert_eq!(e.icon_url, "");
        let e = entity_from_json(EntityKind::School, &json!({"name": "UCLA", "images": {}})).unwrap();
        assert_eq!(e.icon_url, "");
    }

    #[test]
    fn missing_name_is_malformed() {
        let err = entity_from_json(EntityKind::School, &json!({"images": {"tiny": "x"}})).unwrap_err();
        assert!(matches!(err, FetchError::MalformedJson(_)));
    }

    #[test]
    fn kind_parses_from_cli_words() {
        assert_eq!("Sports".parse::<EntityKind>().unwrap(), EntityKind::Sport);
        assert!("league".parse::<EntityKind>().is_err());
    }
}
