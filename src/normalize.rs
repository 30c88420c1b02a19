use crate::Survey;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

const UID_MARKER: &str = "uid=";

/// The list at `data.data`, only when both levels are objects.
fn survey_list(envelope: &Value) -> Option<&Vec<Value>> {
    envelope
        .as_object()?
        .get("data")?
        .as_object()?
        .get("data")?
        .as_array()
}

/// Pulls the surveys out of a raw envelope, keeping the first survey for
/// every uid in upstream order.
///
/// Never fails: an envelope of the wrong shape yields no surveys, and items
/// without a usable link or uid are dropped.
pub fn normalize(envelope: &Value) -> Vec<Survey> {
    let items = match survey_list(envelope) {
        Some(items) => items,
        None => {
            debug!("Envelope has no survey list.");
            return vec![];
        }
    };

    let mut surveys = Vec::with_capacity(items.len());
    let mut seen_uids = HashSet::new();

    for (index, item) in items.iter().enumerate() {
        let mut fields = match item {
            Value::Object(fields) => fields.clone(),
            _ => {
                debug!("Skipping survey {}: not an object.", index);
                continue;
            }
        };

        let link = match take_link(&mut fields) {
            Some(link) => link,
            None => {
                debug!("Skipping survey {}: no link.", index);
                continue;
            }
        };

        let uid = match extract_uid(&link) {
            Some(uid) => uid,
            None => {
                debug!("Skipping survey {}: no uid in {}.", index, link);
                continue;
            }
        };

        if !seen_uids.insert(uid.clone()) {
            debug!("Skipping survey {}: duplicate uid {}.", index, uid);
            continue;
        }

        fields.remove("uid");
        surveys.push(Survey { uid, link, fields });
    }

    surveys
}

/// Removes the link from the item and strips the backslashes upstream
/// sometimes escapes URLs with.
fn take_link(fields: &mut Map<String, Value>) -> Option<String> {
    match fields.remove("link") {
        Some(Value::String(link)) if !link.is_empty() => Some(link.replace('\\', "")),
        _ => None,
    }
}

/// Text between the first `uid=` and the next `&`, trimmed.
///
/// This is a plain substring split, not a query-string parse: a `uid=`
/// inside another parameter's value wins if it comes first.
pub fn extract_uid(link: &str) -> Option<String> {
    let (_, rest) = link.split_once(UID_MARKER)?;
    let uid = match rest.split_once('&') {
        Some((uid, _)) => uid,
        None => rest,
    };

    let uid = uid.trim();
    if uid.is_empty() {
        return None;
    }

    Some(uid.to_string())
}

/// Puts normalized surveys back into the envelope at `data.data`, leaving the
/// other top-level fields alone.
pub fn with_surveys(envelope: Value, surveys: Vec<Survey>) -> Value {
    let mut listing = Map::new();
    listing.insert(
        "data".to_string(),
        Value::Array(
            surveys
                .into_iter()
                .map(|survey| serde_json::to_value(survey).unwrap_or(Value::Null))
                .collect(),
        ),
    );

    let mut envelope = match envelope {
        Value::Object(envelope) => envelope,
        _ => Map::new(),
    };
    envelope.insert("data".to_string(), Value::Object(listing));

    Value::Object(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(items: Value) -> Value {
        json!({ "data": { "data": items } })
    }

    fn uids(surveys: &[Survey]) -> Vec<&str> {
        surveys.iter().map(|s| s.uid.as_str()).collect()
    }

    #[test]
    fn wrong_shapes_yield_nothing() {
        let shapes = [
            json!(null),
            json!([]),
            json!("data"),
            json!({}),
            json!({ "data": null }),
            json!({ "data": [] }),
            json!({ "data": {} }),
            json!({ "data": { "data": null } }),
            json!({ "data": { "data": { "link": "https://x/y?uid=A" } } }),
            json!({ "data": { "data": "uid=A" } }),
            json!({ "data": [[{ "link": "https://x/?uid=A" }]] }),
            json!([[[{ "link": "https://x/?uid=B" }]]]),
            json!([{ "data": [{ "link": "https://x/?uid=C" }] }]),
        ];

        for shape in shapes {
            assert!(normalize(&shape).is_empty(), "{shape}");
        }
    }

    #[test]
    fn extracts_uid_up_to_next_parameter() {
        let surveys = normalize(&envelope(json!([
            { "link": "https://x/y?uid=ABC123&foo=1", "title": "Survey" }
        ])));

        assert_eq!(surveys.len(), 1);
        assert_eq!(surveys[0].uid, "ABC123");
        assert_eq!(surveys[0].link, "https://x/y?uid=ABC123&foo=1");
        assert_eq!(surveys[0].fields.get("title"), Some(&json!("Survey")));
    }

    #[test]
    fn strips_backslashes_before_extracting() {
        let surveys = normalize(&envelope(json!([
            { "link": "https://x/y\\?uid=ABC\\123" }
        ])));

        assert_eq!(surveys.len(), 1);
        assert_eq!(surveys[0].uid, "ABC123");
        assert_eq!(surveys[0].link, "https://x/y?uid=ABC123");
    }

    #[test]
    fn drops_items_without_usable_link() {
        let surveys = normalize(&envelope(json!([
            { "link": "" },
            { "title": "no link" },
            { "link": null },
            { "link": 42 },
            { "link": "https://x/y?id=1" },
            { "link": "https://x/y?uid=&x=1" },
            { "link": "https://x/y?uid=   " },
            "https://x/y?uid=A",
            { "link": "https://x/y?uid=KEEP" }
        ])));

        assert_eq!(uids(&surveys), vec!["KEEP"]);
    }

    #[test]
    fn first_occurrence_wins() {
        let surveys = normalize(&envelope(json!([
            { "link": "https://x/?uid=A", "rank": 1 },
            { "link": "https://x/?uid=B" },
            { "link": "https://x/?uid=A&x=2", "rank": 2 },
            { "link": "https://x/?uid= B " }
        ])));

        assert_eq!(uids(&surveys), vec!["A", "B"]);
        assert_eq!(surveys[0].link, "https://x/?uid=A");
        assert_eq!(surveys[0].fields.get("rank"), Some(&json!(1)));
    }

    #[test]
    fn first_uid_marker_wins_even_inside_another_value() {
        let surveys = normalize(&envelope(json!([
            { "link": "https://x/?ref=xuid=1&uid=2" }
        ])));

        assert_eq!(uids(&surveys), vec!["1"]);
    }

    #[test]
    fn derived_uid_replaces_upstream_uid() {
        let surveys = normalize(&envelope(json!([
            { "link": "https://x/?uid=A", "uid": 99 }
        ])));

        assert_eq!(surveys[0].uid, "A");
        assert!(!surveys[0].fields.contains_key("uid"));
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let first = normalize(&envelope(json!([
            { "link": "https://x/?uid=A\\&b=1", "n": 1 },
            { "link": "https://x/?uid=B", "n": 2 },
            { "link": "https://x/?uid=A", "n": 3 }
        ])));

        let second = normalize(&with_surveys(json!({}), first.clone()));

        assert_eq!(first, second);
    }

    #[test]
    fn with_surveys_keeps_other_fields() {
        let raw = json!({
            "status": true,
            "message": "ok",
            "data": { "data": [], "total": 10 }
        });
        let surveys = vec![Survey {
            uid: "A".to_string(),
            link: "https://x/?uid=A".to_string(),
            fields: Map::new(),
        }];

        let result = with_surveys(raw, surveys);

        assert_eq!(
            result,
            json!({
                "status": true,
                "message": "ok",
                "data": { "data": [ { "uid": "A", "link": "https://x/?uid=A" } ] }
            })
        );
    }

    #[test]
    fn with_surveys_replaces_non_object_envelope() {
        let result = with_surveys(json!([1, 2]), vec![]);
        assert_eq!(result, json!({ "data": { "data": [] } }));
    }

    #[test]
    fn extract_uid_edge_cases() {
        assert_eq!(extract_uid("uid=X"), Some("X".to_string()));
        assert_eq!(extract_uid("https://x/?a=1&uid=Y&uid=Z"), Some("Y".to_string()));
        assert_eq!(extract_uid("https://x/?UID=Y"), None);
        assert_eq!(extract_uid("uid=&"), None);
    }
}
