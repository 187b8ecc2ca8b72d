use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// The single profile document edited by the admin panel.
///
/// Contact fields and the named lists are typed; everything else the backend
/// stores (linkedin, objective, education, ...) rides along in `extra` so a
/// pull followed by a push never drops fields this client does not know about.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ProfileDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub skills: Vec<ListItem>,
    #[serde(default)]
    pub achievements: Vec<ListItem>,
    #[serde(default)]
    pub projects: Vec<ListItem>,
    #[serde(default)]
    pub certificates: Vec<ListItem>,
    #[serde(default)]
    pub snaps: Vec<ListItem>,
    #[serde(default)]
    pub events: Vec<ListItem>,

    #[serde(
        default,
        deserialize_with = "deserialize_ui_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub ui_mode: Option<UiMode>,

    /// Written by the backend on a profile-photo upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfilePhoto>,

    /// Written by the backend on a resume upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<ResumeRef>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProfileDocument {
    pub fn list(&self, key: ListKey) -> &Vec<ListItem> {
        match key {
            ListKey::Skills => &self.skills,
            ListKey::Achievements => &self.achievements,
            ListKey::Projects => &self.projects,
            ListKey::Certificates => &self.certificates,
            ListKey::Snaps => &self.snaps,
            ListKey::Events => &self.events,
        }
    }

    pub fn list_mut(&mut self, key: ListKey) -> &mut Vec<ListItem> {
        match key {
            ListKey::Skills => &mut self.skills,
            ListKey::Achievements => &mut self.achievements,
            ListKey::Projects => &mut self.projects,
            ListKey::Certificates => &mut self.certificates,
            ListKey::Snaps => &mut self.snaps,
            ListKey::Events => &mut self.events,
        }
    }

    pub fn contact(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Location => &self.location,
        }
    }

    pub fn contact_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Phone => &mut self.phone,
            ContactField::Location => &mut self.location,
        }
    }
}

/// One element of a named list.
///
/// The backend stores skills/projects as bare strings and uploads as records,
/// but either shape may show up in any list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ListItem {
    Text(String),
    Record(ItemRecord),
}

impl ListItem {
    /// What the admin list shows for this item: the name, falling back to the url.
    pub fn display_value(&self) -> &str {
        match self {
            ListItem::Text(s) => s,
            ListItem::Record(r) if !r.name.is_empty() => &r.name,
            ListItem::Record(r) => r.url.as_deref().unwrap_or_default(),
        }
    }

    pub fn as_record(&self) -> Option<&ItemRecord> {
        match self {
            ListItem::Record(r) => Some(r),
            ListItem::Text(_) => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut ItemRecord> {
        match self {
            ListItem::Record(r) => Some(r),
            ListItem::Text(_) => None,
        }
    }
}

impl From<&str> for ListItem {
    fn from(s: &str) -> Self {
        ListItem::Text(s.to_string())
    }
}

impl From<ItemRecord> for ListItem {
    fn from(r: ItemRecord) -> Self {
        ListItem::Record(r)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ItemRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lottie animation URL shown on the public page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lottie: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ItemRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ProfilePhoto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_thumb: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ResumeRef {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
}

/// Named ordered lists inside the document.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, AsRefStr, EnumIter,
    EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ListKey {
    Skills,
    Achievements,
    Projects,
    Certificates,
    Snaps,
    Events,
}

impl ListKey {
    /// Resolves list names as well as the short upload tags (`cert`, `snap`,
    /// `event`) and admin DOM ids (`cert-list`, `skills-list`, ...).
    pub fn from_alias(s: &str) -> Option<Self> {
        let s = s.trim();
        let base = s.strip_suffix("-list").unwrap_or(s);
        match base {
            "cert" => Some(ListKey::Certificates),
            "snap" => Some(ListKey::Snaps),
            "event" => Some(ListKey::Events),
            "skill" => Some(ListKey::Skills),
            "achievement" => Some(ListKey::Achievements),
            "project" => Some(ListKey::Projects),
            other => ListKey::from_str(other).ok(),
        }
    }

    /// Lists whose items carry a url/thumb and may come from uploads.
    pub fn is_media(self) -> bool {
        matches!(
            self,
            ListKey::Certificates | ListKey::Snaps | ListKey::Events
        )
    }

    pub fn all() -> impl Iterator<Item = ListKey> {
        ListKey::iter()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Location,
}

/// Presentation mode of the public page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UiMode {
    Ultra,
    Glam,
    Subtle,
    Lottie,
    None,
}

impl UiMode {
    /// Accepts `glam`, `GLAM` and the CSS form `mode-glam`. Empty input is no mode.
    pub fn parse_token(token: &str) -> Option<Self> {
        let t = token.trim();
        let t = t.strip_prefix("mode-").unwrap_or(t);
        if t.is_empty() {
            return None;
        }
        UiMode::from_str(t).ok()
    }

    /// Body class the public page applies, e.g. `mode-glam`.
    pub fn css_class(self) -> String {
        format!("mode-{self}")
    }
}

impl Serialize for UiMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

fn deserialize_ui_mode<'de, D: Deserializer<'de>>(d: D) -> Result<Option<UiMode>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(UiMode::parse_token))
}

/// Attachment kinds accepted by the upload endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum UploadKind {
    Profile,
    Cert,
    Snap,
    Event,
    Resume,
}

impl UploadKind {
    /// The list the backend appends to for this kind, if any.
    pub fn list_key(self) -> Option<ListKey> {
        match self {
            UploadKind::Cert => Some(ListKey::Certificates),
            UploadKind::Snap => Some(ListKey::Snaps),
            UploadKind::Event => Some(ListKey::Events),
            UploadKind::Profile | UploadKind::Resume => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_document_contract_deserialize() {
        // Shape returned by GET /api/data after a few uploads.
        let json = r#"{
            "name": "Ada",
            "email": "ada@example.com",
            "phone": "+1 555",
            "location": "London",
            "linkedin": "https://linkedin.example/ada",
            "skills": ["Rust", "SQL"],
            "projects": ["Engine", {"name": "Loom", "description": "weaving"}],
            "certificates": [{"name": "aws.png", "url": "/static/uploads/aws.png", "thumb": "/static/uploads/thumbs/aws.png"}],
            "ui_mode": "glam",
            "profile": {"picture": "/static/uploads/me.png", "picture_thumb": "/static/uploads/thumbs/me.png"}
        }"#;
        let doc: ProfileDocument = serde_json::from_str(json).expect("document should parse");
        assert_eq!(doc.name, "Ada");
        assert_eq!(doc.skills, vec![ListItem::from("Rust"), ListItem::from("SQL")]);
        assert!(matches!(doc.projects[1], ListItem::Record(_)));
        assert_eq!(
            doc.certificates[0].as_record().and_then(|r| r.url.as_deref()),
            Some("/static/uploads/aws.png")
        );
        assert_eq!(doc.ui_mode, Some(UiMode::Glam));
        assert!(doc.events.is_empty());
        assert_eq!(doc.extra["linkedin"], "https://linkedin.example/ada");
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let json = r#"{"name": "Ada", "objective": "ship it", "skills": [{"name": "Go", "level": 3}]}"#;
        let doc: ProfileDocument = serde_json::from_str(json).expect("document should parse");
        let v = serde_json::to_value(&doc).expect("should serialize");
        assert_eq!(v["objective"], "ship it");
        assert_eq!(v["skills"][0]["level"], 3);
        assert!(v.get("ui_mode").is_none());
    }

    #[test]
    fn test_record_serialization_omits_empty_optionals() {
        let item = ListItem::Record(ItemRecord::named("cert"));
        let v = serde_json::to_value(item).expect("should serialize");
        assert_eq!(v, serde_json::json!({"name": "cert"}));
    }

    #[test]
    fn test_display_value_falls_back_to_url() {
        let item = ListItem::Record(ItemRecord {
            url: Some("/u/x.png".to_string()),
            ..Default::default()
        });
        assert_eq!(item.display_value(), "/u/x.png");
        assert_eq!(ListItem::from("go").display_value(), "go");
    }

    #[test]
    fn test_ui_mode_tokens() {
        assert_eq!(UiMode::parse_token("glam"), Some(UiMode::Glam));
        assert_eq!(UiMode::parse_token("mode-ultra"), Some(UiMode::Ultra));
        assert_eq!(UiMode::parse_token("SUBTLE"), Some(UiMode::Subtle));
        assert_eq!(UiMode::parse_token(""), None);
        assert_eq!(UiMode::parse_token("neon"), None);
        assert_eq!(UiMode::Lottie.css_class(), "mode-lottie");
    }

    #[test]
    fn test_empty_ui_mode_is_absent() {
        let doc: ProfileDocument =
            serde_json::from_str(r#"{"ui_mode": ""}"#).expect("document should parse");
        assert!(doc.ui_mode.is_none());
        let doc: ProfileDocument =
            serde_json::from_str(r#"{"ui_mode": null}"#).expect("document should parse");
        assert!(doc.ui_mode.is_none());
    }

    #[test]
    fn test_list_key_aliases() {
        assert_eq!(ListKey::from_alias("cert"), Some(ListKey::Certificates));
        assert_eq!(ListKey::from_alias("certificates"), Some(ListKey::Certificates));
        assert_eq!(ListKey::from_alias("snaps-list"), Some(ListKey::Snaps));
        assert_eq!(ListKey::from_alias("event"), Some(ListKey::Events));
        assert_eq!(ListKey::from_alias("skills-list"), Some(ListKey::Skills));
        assert_eq!(ListKey::from_alias("resume"), None);
        assert_eq!(ListKey::all().count(), 6);
        assert_eq!(ListKey::Achievements.to_string(), "achievements");
    }

    #[test]
    fn test_upload_kind_tags() {
        assert_eq!(UploadKind::Cert.as_ref(), "cert");
        assert_eq!(UploadKind::Snap.list_key(), Some(ListKey::Snaps));
        assert_eq!(UploadKind::Resume.list_key(), None);
    }
}
