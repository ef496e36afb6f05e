//! Normalized records, one schema per category.
//!
//! Raw upstream items are loosely typed JSON objects whose key names differ
//! per endpoint. They are converted here, at the client boundary, into the
//! typed variants of [`Record`]. Absent source fields become
//! [`FieldValue::Missing`] instead of being dropped.

use std::borrow::Cow;

use serde::Serialize;
use serde_json::{Map, Value};

use super::category::DataCategory;

type RawItem = Map<String, Value>;

/// A single field value of a normalized record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    /// The upstream item did not carry this field. Serialized as `null`.
    Missing,
}

impl FieldValue {
    /// Convert a raw JSON value (or its absence) into a field value.
    pub fn from_raw(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::String(s)) => Self::Text(s.trim().to_string()),
            Some(Value::Number(n)) => Self::Number(n.clone()),
            Some(Value::Bool(b)) => Self::Text(b.to_string()),
            Some(other) => Self::Text(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Text the filter engine matches against, `None` when missing.
    pub fn search_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Missing => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A parking lot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkingLot {
    pub id: FieldValue,
    pub name: FieldValue,
    pub address: FieldValue,
    pub capacity: FieldValue,
    pub fee_info: FieldValue,
    pub contact: FieldValue,
    pub operating_hours: FieldValue,
    pub operation_day: FieldValue,
    pub facility_type: FieldValue,
    pub latitude: FieldValue,
    pub longitude: FieldValue,
}

/// A designated smoking area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmokingArea {
    pub id: FieldValue,
    pub name: FieldValue,
    pub address: FieldValue,
    pub managing_agency: FieldValue,
    pub contact: FieldValue,
    pub latitude: FieldValue,
    pub longitude: FieldValue,
}

/// A certified restaurant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Restaurant {
    pub id: FieldValue,
    pub name: FieldValue,
    pub address: FieldValue,
    pub main_menu: FieldValue,
    pub contact: FieldValue,
    pub business_type: FieldValue,
    pub latitude: FieldValue,
    pub longitude: FieldValue,
}

/// A CCTV installation. Has no name; the address is its primary key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CctvInstallation {
    pub id: FieldValue,
    pub address: FieldValue,
    pub purpose: FieldValue,
    pub resolution: FieldValue,
    pub install_year: FieldValue,
    pub managing_agency: FieldValue,
    pub contact: FieldValue,
    pub latitude: FieldValue,
    pub longitude: FieldValue,
}

/// A normalized record of any category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Parking(ParkingLot),
    SmokingArea(SmokingArea),
    Restaurant(Restaurant),
    Cctv(CctvInstallation),
}

fn raw(item: &RawItem, key: &str) -> FieldValue {
    FieldValue::from_raw(item.get(key))
}

/// Join the opening and closing times into a single `open~close` value.
fn operating_hours(item: &RawItem) -> FieldValue {
    let open = raw(item, "operOpenHm");
    let close = raw(item, "operCloseHm");
    if open.is_missing() && close.is_missing() {
        return FieldValue::Missing;
    }
    let open = open.search_text().unwrap_or_default();
    let close = close.search_text().unwrap_or_default();
    FieldValue::Text(format!("{open}~{close}"))
}

impl Record {
    /// Normalize one raw upstream item according to the category schema.
    pub fn from_raw(category: DataCategory, item: &RawItem) -> Self {
        match category {
            DataCategory::Parking => Self::Parking(ParkingLot {
                id: raw(item, "prkplceNo"),
                name: raw(item, "prkplceNm"),
                address: raw(item, "rdnmadr"),
                capacity: raw(item, "prkcmprt"),
                fee_info: raw(item, "feedingSe"),
                contact: raw(item, "phoneNumber"),
                operating_hours: operating_hours(item),
                operation_day: raw(item, "operDay"),
                facility_type: raw(item, "prkplceSe"),
                latitude: raw(item, "latitude"),
                longitude: raw(item, "longitude"),
            }),
            DataCategory::SmokingArea => Self::SmokingArea(SmokingArea {
                id: raw(item, "smkngAreaNo"),
                name: raw(item, "smkngAreaNm"),
                address: raw(item, "rdnmadr"),
                managing_agency: raw(item, "mngmtInsttNm"),
                contact: raw(item, "mngmtInsttPhoneNumber"),
                latitude: raw(item, "latitude"),
                longitude: raw(item, "longitude"),
            }),
            DataCategory::Restaurant => Self::Restaurant(Restaurant {
                id: raw(item, "restaurantId"),
                name: raw(item, "mtlty"),
                address: raw(item, "addr"),
                main_menu: raw(item, "main_menu"),
                contact: raw(item, "telno"),
                business_type: raw(item, "bizestblSe"),
                latitude: raw(item, "latitude"),
                longitude: raw(item, "longitude"),
            }),
            DataCategory::Cctv => Self::Cctv(CctvInstallation {
                id: raw(item, "cctvId"),
                address: raw(item, "rdnmadr"),
                purpose: raw(item, "instlPurpsSe"),
                resolution: raw(item, "cmeraPixel"),
                install_year: raw(item, "instlYear"),
                managing_agency: raw(item, "mngmtInsttNm"),
                contact: raw(item, "mngmtInsttPhoneNumber"),
                latitude: raw(item, "latitude"),
                longitude: raw(item, "longitude"),
            }),
        }
    }

    pub fn category(&self) -> DataCategory {
        match self {
            Self::Parking(_) => DataCategory::Parking,
            Self::SmokingArea(_) => DataCategory::SmokingArea,
            Self::Restaurant(_) => DataCategory::Restaurant,
            Self::Cctv(_) => DataCategory::Cctv,
        }
    }

    /// Look up a field by its normalized name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        let value = match (self, name) {
            (_, "id") => self.id(),
            (_, "latitude") => self.coordinates().0,
            (_, "longitude") => self.coordinates().1,
            (Self::Parking(p), _) => match name {
                "name" => &p.name,
                "address" => &p.address,
                "capacity" => &p.capacity,
                "fee_info" => &p.fee_info,
                "contact" => &p.contact,
                "operating_hours" => &p.operating_hours,
                "operation_day" => &p.operation_day,
                "facility_type" => &p.facility_type,
                _ => return None,
            },
            (Self::SmokingArea(s), _) => match name {
                "name" => &s.name,
                "address" => &s.address,
                "managing_agency" => &s.managing_agency,
                "contact" => &s.contact,
                _ => return None,
            },
            (Self::Restaurant(r), _) => match name {
                "name" => &r.name,
                "address" => &r.address,
                "main_menu" => &r.main_menu,
                "contact" => &r.contact,
                "business_type" => &r.business_type,
                _ => return None,
            },
            (Self::Cctv(c), _) => match name {
                "address" => &c.address,
                "purpose" => &c.purpose,
                "resolution" => &c.resolution,
                "install_year" => &c.install_year,
                "managing_agency" => &c.managing_agency,
                "contact" => &c.contact,
                _ => return None,
            },
        };
        Some(value)
    }

    fn id(&self) -> &FieldValue {
        match self {
            Self::Parking(p) => &p.id,
            Self::SmokingArea(s) => &s.id,
            Self::Restaurant(r) => &r.id,
            Self::Cctv(c) => &c.id,
        }
    }

    fn coordinates(&self) -> (&FieldValue, &FieldValue) {
        match self {
            Self::Parking(p) => (&p.latitude, &p.longitude),
            Self::SmokingArea(s) => (&s.latitude, &s.longitude),
            Self::Restaurant(r) => (&r.latitude, &r.longitude),
            Self::Cctv(c) => (&c.latitude, &c.longitude),
        }
    }

    /// The name, or the address for categories without one.
    pub fn primary_key(&self) -> &FieldValue {
        match self {
            Self::Parking(p) => &p.name,
            Self::SmokingArea(s) => &s.name,
            Self::Restaurant(r) => &r.name,
            Self::Cctv(c) => &c.address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> RawItem {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parking_normalization() {
        let raw = item(json!({
            "prkplceNo": "P-001",
            "prkplceNm": "세종시청 주차장",
            "rdnmadr": "세종특별자치시 한누리대로 2130",
            "prkcmprt": 350,
            "feedingSe": "무료",
            "phoneNumber": "044-300-3114",
            "operOpenHm": "09:00",
            "operCloseHm": "18:00",
            "latitude": "36.48",
        }));
        let record = Record::from_raw(DataCategory::Parking, &raw);
        let Record::Parking(lot) = &record else {
            panic!("expected parking record");
        };
        assert_eq!(lot.name, FieldValue::from("세종시청 주차장"));
        assert_eq!(lot.capacity, FieldValue::Number(350.into()));
        assert_eq!(lot.operating_hours, FieldValue::from("09:00~18:00"));
        assert_eq!(lot.longitude, FieldValue::Missing);
        assert_eq!(record.category(), DataCategory::Parking);
    }

    #[test]
    fn test_missing_fields_are_explicit() {
        let record = Record::from_raw(DataCategory::Restaurant, &item(json!({"mtlty": "한식당"})));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["name"], json!("한식당"));
        assert!(value.get("address").is_some());
        assert_eq!(value["address"], Value::Null);
        assert_eq!(value["main_menu"], Value::Null);
    }

    #[test]
    fn test_operating_hours_all_missing() {
        let record = Record::from_raw(DataCategory::Parking, &item(json!({})));
        assert_eq!(record.field("operating_hours"), Some(&FieldValue::Missing));
    }

    #[test]
    fn test_field_lookup() {
        let record = Record::from_raw(
            DataCategory::Cctv,
            &item(json!({"rdnmadr": "세종특별자치시 도움1로 116", "instlPurpsSe": "방범", "cctvId": 7})),
        );
        assert_eq!(record.field("purpose"), Some(&FieldValue::from("방범")));
        assert_eq!(record.field("id"), Some(&FieldValue::Number(7.into())));
        assert_eq!(record.field("name"), None);
        assert_eq!(record.primary_key(), &FieldValue::from("세종특별자치시 도움1로 116"));
    }

    #[test]
    fn test_search_text() {
        assert_eq!(FieldValue::Number(42.into()).search_text().unwrap(), "42");
        assert!(FieldValue::Missing.search_text().is_none());
        assert_eq!(FieldValue::from_raw(Some(&json!("  공백  "))), FieldValue::from("공백"));
    }
}
