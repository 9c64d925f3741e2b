use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shown in place of optional text the API left out.
pub const PLACEHOLDER: &str = "N/A";

/// `/users/{username}`. Every field is tolerated individually; only the body
/// as a whole has to be an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub followers: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub following: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub public_repos: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub html_url: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<String>,
}

impl UserProfile {
    pub fn display_login(&self) -> &str {
        or_placeholder(Some(self.login.as_str()))
    }

    pub fn display_name(&self) -> &str {
        or_placeholder(self.name.as_deref())
    }

    pub fn display_bio(&self) -> &str {
        or_placeholder(self.bio.as_deref())
    }

    pub fn display_url(&self) -> &str {
        or_placeholder(Some(self.html_url.as_str()))
    }
}

fn or_placeholder(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => PLACEHOLDER,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry of `/users/{username}/repos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stargazers_count: u64,
}

/// `/search/repositories?q=user:{username}`. Only the count is used.
#[derive(Debug, Deserialize)]
pub struct StarSearch {
    pub total_count: u64,
}

/// `/search/issues?q=author:{username}+type:pr`.
#[derive(Debug, Deserialize)]
pub struct PullRequestSearch {
    pub items: Vec<PullRequestRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PullRequestRecord {
    #[serde(default)]
    pub pull_request: Option<PullRequestMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PullRequestMeta {
    #[serde(default)]
    pub merged_at: Option<String>,
}

impl PullRequestRecord {
    pub fn is_merged(&self) -> bool {
        self.pull_request
            .as_ref()
            .is_some_and(|pr| pr.merged_at.is_some())
    }
}

/// Top-level JSON shape an endpoint must return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
}

impl Shape {
    fn matches(self, value: &Value) -> bool {
        match self {
            Shape::Object => value.is_object(),
            Shape::Array => value.is_array(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Shape::Object => "object",
            Shape::Array => "array",
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check the top-level shape, then deserialize into `T`.
///
/// The shape check matters for `UserProfile`: serde would otherwise accept
/// an empty array as a struct with every field defaulted.
pub fn decode<T: DeserializeOwned>(value: Value, shape: Shape) -> Result<T> {
    if !shape.matches(&value) {
        anyhow::bail!(
            "expected a JSON {}, got {}",
            shape.name(),
            json_kind(&value)
        );
    }

    serde_json::from_value(value)
        .with_context(|| format!("Failed to deserialize {}", std::any::type_name::<T>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_tolerates_missing_fields() {
        let profile: UserProfile = decode(json!({ "followers": 3 }), Shape::Object).unwrap();
        assert_eq!(profile.followers, 3);
        assert_eq!(profile.display_login(), PLACEHOLDER);
        assert_eq!(profile.display_name(), PLACEHOLDER);
        assert_eq!(profile.display_bio(), PLACEHOLDER);
        assert_eq!(profile.display_url(), PLACEHOLDER);
    }

    #[test]
    fn profile_tolerates_null_counts_and_blank_bio() {
        let profile: UserProfile = decode(
            json!({
                "login": "octocat",
                "followers": null,
                "html_url": null,
                "bio": "  ",
                "name": "The Octocat"
            }),
            Shape::Object,
        )
        .unwrap();
        assert_eq!(profile.followers, 0);
        assert_eq!(profile.display_login(), "octocat");
        assert_eq!(profile.display_name(), "The Octocat");
        assert_eq!(profile.display_bio(), PLACEHOLDER);
        assert_eq!(profile.display_url(), PLACEHOLDER);
    }

    #[test]
    fn profile_must_be_an_object() {
        let err = decode::<UserProfile>(json!([]), Shape::Object).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object, got array"));

        assert!(decode::<UserProfile>(json!("octocat"), Shape::Object).is_err());
    }

    #[test]
    fn repos_require_name_and_url() {
        let repos: Vec<RepositorySummary> = decode(
            json!([{ "name": "a", "html_url": "u1", "stargazers_count": 4 }]),
            Shape::Array,
        )
        .unwrap();
        assert_eq!(repos[0].name, "a");
        assert_eq!(repos[0].stargazers_count, 4);
        assert!(repos[0].language.is_none());

        assert!(decode::<Vec<RepositorySummary>>(json!([{ "name": "a" }]), Shape::Array).is_err());
        assert!(decode::<Vec<RepositorySummary>>(json!({ "name": "a" }), Shape::Array).is_err());
    }

    #[test]
    fn merged_requires_non_null_timestamp() {
        let search: PullRequestSearch = decode(
            json!({ "items": [
                { "title": "Fix typo", "html_url": "u", "pull_request": { "merged_at": "2020-01-01" } },
                { "pull_request": { "merged_at": null } },
                { "pull_request": {} },
                {}
            ]}),
            Shape::Object,
        )
        .unwrap();
        let merged: Vec<bool> = search.items.iter().map(PullRequestRecord::is_merged).collect();
        assert_eq!(merged, vec![true, false, false, false]);
    }

    #[test]
    fn searches_require_their_fields() {
        assert!(decode::<StarSearch>(json!({ "items": [] }), Shape::Object).is_err());
        assert!(decode::<PullRequestSearch>(json!({ "total_count": 0 }), Shape::Object).is_err());

        let stars: StarSearch = decode(json!({ "total_count": 7, "items": [] }), Shape::Object).unwrap();
        assert_eq!(stars.total_count, 7);
    }
}
