//! `Duration` field codecs for `#[serde(with = ...)]`.
//!
//! Simulation state uses [`nanos`] so a saved session resumes bit-for-bit; decayed
//! fall periods are not whole milliseconds. Hand-edited config files use [`millis`].

pub mod nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_nanos)
    }
}

pub mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Timed {
        #[serde(with = "super::nanos")]
        exact: Duration,
        #[serde(with = "super::millis")]
        coarse: Duration,
    }

    #[test]
    fn nanos_keep_fractional_milliseconds() {
        let timed = Timed {
            exact: Duration::from_nanos(970_225_000),
            coarse: Duration::from_millis(300),
        };
        let json = serde_json::to_string(&timed).unwrap();
        assert_eq!(json, r#"{"exact":970225000,"coarse":300}"#);
        assert_eq!(serde_json::from_str::<Timed>(&json).unwrap(), timed);
    }
}
