use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::FilterError;

/// One page of the catalog search endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub per_page: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub records: Vec<PartialRecord>,
    /// Reported grand total. Zero means the API has not committed to a number yet.
    #[serde(default)]
    pub total: i64,
}

impl SearchResponse {
    pub fn from_body(body: &str) -> Result<Self, FilterError> {
        let value: Value =
            serde_json::from_str(body).map_err(|err| FilterError::malformed(err, body))?;
        if !value.is_object() {
            return Err(FilterError::malformed(
                "expected a JSON object at top level",
                body,
            ));
        }
        SearchResponse::deserialize(value).map_err(|err| FilterError::malformed(err, body))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<PartialRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<PartialRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A catalog event: a typed view over a handful of known fields plus the
/// complete object it was decoded from.
///
/// The typed fields are read-only views. Encoding a decoded record emits the
/// original object untouched, so fields this tool knows nothing about survive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    pub id: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub categories: Vec<Category>,
    pub venue: Option<Venue>,
    raw: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

impl PartialRecord {
    pub fn decode(bytes: &[u8]) -> Result<Self, FilterError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|err| FilterError::malformed(err, &String::from_utf8_lossy(bytes)))?;
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(FilterError::malformed(
                "record is not a JSON object",
                &other.to_string(),
            )),
        }
    }

    /// Pulls the known fields out of `map` on a best-effort basis and keeps
    /// `map` itself for re-encoding. Missing or mistyped fields stay empty.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let categories = map
            .get("categories")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|obj| Category {
                        id: string_field(obj, "id"),
                        name: string_field(obj, "name"),
                        kind: string_field(obj, "type"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let venue = map.get("venue").and_then(Value::as_object).map(|obj| Venue {
            id: string_field(obj, "id"),
            name: string_field(obj, "name"),
            city: string_field(obj, "city"),
            region: string_field(obj, "region"),
            postal_code: string_field(obj, "postalCode"),
            country: string_field(obj, "country"),
        });

        Self {
            id: string_field(&map, "id"),
            name: string_field(&map, "name"),
            date: string_field(&map, "date"),
            time: string_field(&map, "time"),
            categories,
            venue,
            raw: Some(map),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, FilterError> {
        serde_json::to_vec(self).map_err(|err| FilterError::Output(err.into()))
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> Option<&Map<String, Value>> {
        self.raw.as_ref()
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

impl<'de> Deserialize<'de> for PartialRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(PartialRecord::from_map(map))
    }
}

#[derive(Serialize)]
struct KnownFields<'a> {
    id: &'a str,
    name: &'a str,
    date: &'a str,
    time: &'a str,
    categories: &'a [Category],
    venue: Option<&'a Venue>,
}

impl Serialize for PartialRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.raw {
            Some(raw) => raw.serialize(serializer),
            // lossy: only reachable for records built by hand
            None => KnownFields {
                id: &self.id,
                name: &self.name,
                date: &self.date,
                time: &self.time,
                categories: &self.categories,
                venue: self.venue.as_ref(),
            }
            .serialize(serializer),
        }
    }
}
