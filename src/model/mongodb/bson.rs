use std::fmt::{self, Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use mongodb::bson::{doc, oid::ObjectId, Document};
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// A unique database document ID.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id(ObjectId);

impl Id {
    /// Generate a fresh ID.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// The filter document selecting this ID.
    pub fn as_doc(&self) -> Document {
        doc! { "_id": self.0 }
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Id {
    type Target = ObjectId;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Id {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.to_hex())
    }
}

impl FromStr for Id {
    type Err = mongodb::bson::oid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse::<ObjectId>()?))
    }
}

impl From<ObjectId> for Id {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl<'a> FromParam<'a> for Id {
    type Error = mongodb::bson::oid::Error;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse::<Id>()
    }
}

/// De/serialise a `HashMap` with non-string keys as a map with string keys,
/// as required by BSON documents.
///
/// Use via `#[serde(with = "serde_string_map")]`.
pub mod serde_string_map {
    use std::collections::HashMap;
    use std::fmt::Display;
    use std::hash::Hash;
    use std::str::FromStr;

    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, K, V>(map: &HashMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        K: Display,
        V: Serialize,
    {
        serializer.collect_map(map.iter().map(|(key, value)| (key.to_string(), value)))
    }

    pub fn deserialize<'de, D, K, V>(deserializer: D) -> Result<HashMap<K, V>, D::Error>
    where
        D: Deserializer<'de>,
        K: FromStr + Eq + Hash,
        K::Err: Display,
        V: Deserialize<'de>,
    {
        HashMap::<String, V>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, value)| Ok((key.parse().map_err(D::Error::custom)?, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use mongodb::bson::{from_bson, to_bson, Bson};

    use super::*;

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "serde_string_map")]
        map: HashMap<Id, u32>,
    }

    #[test]
    fn id_round_trip_via_string() {
        let id = Id::new();
        let parsed = id.to_string().parse::<Id>().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn string_map_round_trip() {
        let mut map = HashMap::new();
        map.insert(Id::new(), 1);
        map.insert(Id::new(), 2);
        let wrapper = Wrapper { map };

        let bson = to_bson(&wrapper).unwrap();
        if let Bson::Document(ref doc) = bson {
            let map = doc.get_document("map").unwrap();
            assert!(map.keys().all(|key| key.parse::<Id>().is_ok()));
        } else {
            panic!("Expected a document");
        }

        let back: Wrapper = from_bson(bson).unwrap();
        assert_eq!(wrapper, back);
    }
}
