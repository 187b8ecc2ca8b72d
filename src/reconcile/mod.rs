//! Merges server-sent events into the local document.
//!
//! The backend has already persisted whatever a notification describes, so
//! applying one is a plain local append/update: no save is scheduled and no
//! existing entry is removed or reordered.

use crate::models::{ItemRecord, ListItem, ListKey, ProfileDocument, UiMode};
use serde::Deserialize;

/// `processed` payload: `{kind, name, url, thumb}`. `kind` is either a list
/// name or the short upload tag the file was sent with.
#[derive(Deserialize, Clone, Debug, PartialEq)]
struct ProcessedPayload {
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    thumb: Option<String>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
struct UiModePayload {
    #[serde(default)]
    ui_mode: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PushEvent {
    /// Background processing finished for an uploaded item.
    Processed { list: ListKey, item: ItemRecord },
    /// Someone saved a new presentation mode.
    UiMode(Option<UiMode>),
    /// Welcome ping sent when the stream opens.
    Connected,
}

impl PushEvent {
    /// Parses one SSE message. `Ok(None)` means the event is well-formed but
    /// not something this client reacts to (unknown name, non-list kind).
    pub fn parse(event: &str, data: &str) -> Result<Option<Self>, serde_json::Error> {
        match event {
            "processed" => {
                let p: ProcessedPayload = serde_json::from_str(data)?;
                let Some(list) = ListKey::from_alias(&p.kind) else {
                    return Ok(None);
                };
                Ok(Some(PushEvent::Processed {
                    list,
                    item: ItemRecord {
                        name: p.name,
                        url: p.url,
                        thumb: p.thumb,
                        ..Default::default()
                    },
                }))
            }
            "ui_mode" => {
                let p: UiModePayload = serde_json::from_str(data)?;
                let token = p.ui_mode.as_deref().map(str::trim).unwrap_or_default();
                if token.is_empty() {
                    return Ok(Some(PushEvent::UiMode(None)));
                }
                // an unrecognised token leaves the current mode alone
                Ok(UiMode::parse_token(token).map(|mode| PushEvent::UiMode(Some(mode))))
            }
            "connected" => Ok(Some(PushEvent::Connected)),
            _ => Ok(None),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Reconciled {
    Appended { list: ListKey, index: usize },
    /// The item is already in the list, typically because the post-upload
    /// pull brought it in before the notification arrived.
    AlreadyPresent { list: ListKey },
    UiModeChanged(Option<UiMode>),
    Ignored,
}

pub fn apply(doc: &mut ProfileDocument, event: PushEvent) -> Reconciled {
    match event {
        PushEvent::Processed { list, item } => {
            let items = doc.list_mut(list);
            let present = item.url.as_deref().is_some_and(|url| {
                items
                    .iter()
                    .filter_map(ListItem::as_record)
                    .any(|r| r.url.as_deref() == Some(url))
            });
            if present {
                return Reconciled::AlreadyPresent { list };
            }
            items.push(ListItem::Record(item));
            Reconciled::Appended {
                list,
                index: items.len() - 1,
            }
        }
        PushEvent::UiMode(mode) => {
            doc.ui_mode = mode;
            Reconciled::UiModeChanged(mode)
        }
        PushEvent::Connected => Reconciled::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, url: &str) -> ListItem {
        ListItem::Record(ItemRecord {
            url: Some(url.to_string()),
            ..ItemRecord::named(name)
        })
    }

    #[test]
    fn test_processed_appends_after_existing_entries() {
        let mut doc = ProfileDocument {
            certificates: vec![rec("A", "/u/a.png"), rec("B", "/u/b.png")],
            ..Default::default()
        };
        let ev = PushEvent::parse(
            "processed",
            r#"{"kind": "certificates", "name": "C", "url": "/u/c.png", "thumb": "/u/thumbs/c.png"}"#,
        )
        .expect("payload should parse")
        .expect("certificates is a list");

        assert_eq!(
            apply(&mut doc, ev),
            Reconciled::Appended {
                list: ListKey::Certificates,
                index: 2
            }
        );
        let names: Vec<_> = doc.certificates.iter().map(|i| i.display_value()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(
            doc.certificates[2].as_record().and_then(|r| r.thumb.as_deref()),
            Some("/u/thumbs/c.png")
        );
    }

    #[test]
    fn test_processed_accepts_upload_tags() {
        let ev = PushEvent::parse("processed", r#"{"kind": "event", "name": "hack.png", "url": "/u/hack.png"}"#)
            .expect("payload should parse");
        assert!(matches!(ev, Some(PushEvent::Processed { list: ListKey::Events, .. })));
    }

    #[test]
    fn test_processed_for_known_url_is_not_duplicated() {
        let mut doc = ProfileDocument {
            snaps: vec![rec("x.png", "/u/x.png")],
            ..Default::default()
        };
        let ev = PushEvent::Processed {
            list: ListKey::Snaps,
            item: ItemRecord {
                url: Some("/u/x.png".to_string()),
                ..ItemRecord::named("x.png")
            },
        };
        assert_eq!(
            apply(&mut doc, ev),
            Reconciled::AlreadyPresent {
                list: ListKey::Snaps
            }
        );
        assert_eq!(doc.snaps.len(), 1);
    }

    #[test]
    fn test_non_list_kinds_and_unknown_events_are_ignored() {
        assert_eq!(
            PushEvent::parse("processed", r#"{"kind": "profile", "name": "me.png"}"#).expect("parses"),
            None
        );
        assert_eq!(PushEvent::parse("heartbeat", "{}").expect("parses"), None);
        assert_eq!(
            PushEvent::parse("connected", r#"{"time": 1.5}"#).expect("parses"),
            Some(PushEvent::Connected)
        );
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(PushEvent::parse("processed", "not json").is_err());
        assert!(PushEvent::parse("processed", r#"{"name": "no kind"}"#).is_err());
    }

    #[test]
    fn test_ui_mode_replaces_local_setting() {
        let mut doc = ProfileDocument {
            ui_mode: Some(UiMode::Subtle),
            skills: vec![ListItem::from("go")],
            ..Default::default()
        };
        let ev = PushEvent::parse("ui_mode", r#"{"ui_mode": "ultra"}"#)
            .expect("payload should parse")
            .expect("ui_mode is handled");
        assert_eq!(apply(&mut doc, ev), Reconciled::UiModeChanged(Some(UiMode::Ultra)));
        assert_eq!(doc.ui_mode, Some(UiMode::Ultra));
        assert_eq!(doc.skills.len(), 1);

        let cleared = PushEvent::parse("ui_mode", r#"{"ui_mode": ""}"#)
            .expect("payload should parse")
            .expect("ui_mode is handled");
        apply(&mut doc, cleared);
        assert_eq!(doc.ui_mode, None);
    }

    #[test]
    fn test_unknown_ui_mode_token_is_ignored() {
        assert_eq!(
            PushEvent::parse("ui_mode", r#"{"ui_mode": "sparkly"}"#).expect("parses"),
            None
        );
        assert_eq!(
            PushEvent::parse("ui_mode", r#"{"ui_mode": "mode-glam"}"#).expect("parses"),
            Some(PushEvent::UiMode(Some(UiMode::Glam)))
        );
        assert_eq!(
            PushEvent::parse("ui_mode", r#"{"ui_mode": null}"#).expect("parses"),
            Some(PushEvent::UiMode(None))
        );
    }
}
