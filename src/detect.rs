//! Finding the property that holds a feature's administrative name.

use crate::boundary::BoundaryCollection;
use crate::error::{RegionMapError, Result};
use crate::util::contains_hangul;
use serde_json::Value;

/// Known administrative-name keys from common boundary sources (KOSTAT,
/// SGIS, the southkorea-maps repo), tried in this order.
pub const CANDIDATE_NAME_FIELDS: &[&str] = &[
    "adm_nm",
    "ADM_NM",
    "name",
    "SIG_KOR_NM",
    "EMD_KOR_NM",
    "CTP_KOR_NM",
    "adm_nm_eng",
    "ADM_NM_2",
    "NAME",
];

/// Pick the name field from the first feature that has any properties.
///
/// Order of preference: the first key of [`CANDIDATE_NAME_FIELDS`] present,
/// then the first string property containing Hangul, then the first
/// property in source order.
///
/// # Errors
///
/// [`RegionMapError::NoNameFieldFound`] if the collection is empty or no
/// feature has properties.
pub fn detect_name_field(collection: &BoundaryCollection) -> Result<String> {
    let props = collection
        .features
        .iter()
        .map(|f| &f.properties)
        .find(|p| !p.is_empty())
        .ok_or(RegionMapError::NoNameFieldFound)?;

    if let Some(c) = CANDIDATE_NAME_FIELDS.iter().find(|c| props.contains_key(**c)) {
        return Ok((*c).to_string());
    }

    let hangul = props.iter().find_map(|(k, v)| match v {
        Value::String(s) if contains_hangul(s) => Some(k.clone()),
        _ => None,
    });
    if let Some(k) = hangul {
        log::debug!("name field `{k}` picked by Hangul content");
        return Ok(k);
    }

    props
        .keys()
        .next()
        .cloned()
        .ok_or(RegionMapError::NoNameFieldFound)
}

/// Check a manual override against the data.
///
/// # Errors
///
/// [`RegionMapError::UnknownNameField`] if no feature carries `field`.
pub fn require_name_field(collection: &BoundaryCollection, field: &str) -> Result<String> {
    if collection
        .features
        .iter()
        .any(|f| f.properties.contains_key(field))
    {
        Ok(field.to_string())
    } else {
        Err(RegionMapError::UnknownNameField {
            field: field.to_string(),
        })
    }
}

/// Count features among the first `sample` that lack `field`.
///
/// Returns `(missing, sampled)`.
pub fn missing_name_field(collection: &BoundaryCollection, field: &str, sample: usize) -> (usize, usize) {
    let sampled: Vec<_> = collection.features.iter().take(sample).collect();
    let missing = sampled
        .iter()
        .filter(|f| !f.properties.contains_key(field))
        .count();
    (missing, sampled.len())
}

/// Validate that `field` is present across a sample of features.
///
/// With `strict` an inconsistent schema is an error; otherwise it is logged
/// and the pass goes on with those features bound to zero.
///
/// # Errors
///
/// [`RegionMapError::InconsistentNameField`] in strict mode.
pub fn validate_name_field(
    collection: &BoundaryCollection,
    field: &str,
    sample: usize,
    strict: bool,
) -> Result<()> {
    let (missing, sampled) = missing_name_field(collection, field, sample);
    if missing == 0 {
        return Ok(());
    }
    if strict {
        return Err(RegionMapError::InconsistentNameField {
            field: field.to_string(),
            missing,
            sampled,
        });
    }
    log::warn!("name field `{field}` is missing on {missing} of {sampled} sampled features");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection(props: Vec<Value>) -> BoundaryCollection {
        let features: Vec<Value> = props
            .into_iter()
            .map(|p| json!({"type": "Feature", "geometry": null, "properties": p}))
            .collect();
        BoundaryCollection::from_value(json!({"type": "FeatureCollection", "features": features}))
            .unwrap()
    }

    #[test]
    fn candidate_priority_beats_property_order() {
        let c = collection(vec![json!({"name": "종로구", "adm_nm": "서울특별시 종로구"})]);
        assert_eq!(detect_name_field(&c).unwrap(), "adm_nm");
    }

    #[test]
    fn falls_back_to_hangul_value() {
        let c = collection(vec![json!({"code": "11010", "label": "종로구"})]);
        assert_eq!(detect_name_field(&c).unwrap(), "label");
    }

    #[test]
    fn falls_back_to_first_key() {
        let c = collection(vec![json!({"code": "11010", "label": "Jongno"})]);
        assert_eq!(detect_name_field(&c).unwrap(), "code");
    }

    #[test]
    fn skips_features_without_properties() {
        let c = collection(vec![json!(null), json!({"SIG_KOR_NM": "종로구"})]);
        assert_eq!(detect_name_field(&c).unwrap(), "SIG_KOR_NM");
    }

    #[test]
    fn empty_collection_has_no_name_field() {
        let c = collection(vec![]);
        assert!(matches!(
            detect_name_field(&c),
            Err(RegionMapError::NoNameFieldFound)
        ));
        let c = collection(vec![json!({}), json!(null)]);
        assert!(matches!(
            detect_name_field(&c),
            Err(RegionMapError::NoNameFieldFound)
        ));
    }

    #[test]
    fn override_must_exist_somewhere() {
        let c = collection(vec![json!({"name": "종로구"})]);
        assert_eq!(require_name_field(&c, "name").unwrap(), "name");
        assert!(matches!(
            require_name_field(&c, "adm_nm"),
            Err(RegionMapError::UnknownNameField { .. })
        ));
    }

    #[test]
    fn strict_validation_reports_missing_counts() {
        let c = collection(vec![
            json!({"name": "종로구"}),
            json!({"NAME": "중구"}),
            json!({"name": "용산구"}),
        ]);
        assert_eq!(missing_name_field(&c, "name", 50), (1, 3));
        assert_eq!(missing_name_field(&c, "name", 1), (0, 1));
        assert!(validate_name_field(&c, "name", 50, false).is_ok());
        match validate_name_field(&c, "name", 50, true) {
            Err(RegionMapError::InconsistentNameField { missing, sampled, .. }) => {
                assert_eq!((missing, sampled), (1, 3));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
