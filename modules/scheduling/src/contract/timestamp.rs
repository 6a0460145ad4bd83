//! Serde adapter rendering epoch-millisecond fields as RFC 3339 UTC text.
//!
//! Use as `#[serde(with = "crate::contract::timestamp")]` on `i64` fields.

use serde::{de, ser, Deserialize, Deserializer, Serializer};

use crate::domain::clock::{format_timestamp, parse_timestamp};

pub fn serialize<S>(millis: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let text = format_timestamp(*millis).ok_or_else(|| {
        <S::Error as ser::Error>::custom(format!("{millis} ms is outside the representable range"))
    })?;
    serializer.serialize_str(&text)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use crate::contract::model::{Appointment, Slot};

    #[test]
    fn appointment_instants_are_rfc3339_on_the_wire() {
        let appointment = Appointment {
            id: 7,
            begins_at: 1_755_266_400_000,
            ends_at: 1_755_266_400_000 + 3_599_999,
            owner_id: 1,
            is_deleted: false,
            title: Some("Checkup".into()),
            created_at: 1_754_006_400_000,
            updated_at: 1_754_006_400_000,
        };

        let json = serde_json::to_value(&appointment).unwrap();
        assert_eq!(json["begins_at"], "2025-08-15T14:00:00Z");
        assert_eq!(json["ends_at"], "2025-08-15T14:59:59.999Z");
        assert_eq!(json["created_at"], "2025-08-01T00:00:00Z");

        let back: Appointment = serde_json::from_value(json).unwrap();
        assert_eq!(back, appointment);
    }

    #[test]
    fn non_rfc3339_text_is_rejected() {
        let res: Result<Slot, _> = serde_json::from_value(serde_json::json!({
            "begins_at": 1_755_266_400_000_i64,
            "ends_at": "2025-08-15T14:59:59.999Z"
        }));
        assert!(res.is_err());
        let res: Result<Slot, _> = serde_json::from_value(serde_json::json!({
            "begins_at": "2025-08-15 14:00",
            "ends_at": "2025-08-15T14:59:59.999Z"
        }));
        assert!(res.is_err());
    }
}
