use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A survey that made it through normalization.
///
/// `uid` and `link` are derived; every other upstream field is carried in
/// `fields` untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Survey {
    pub uid: String,

    pub link: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}
