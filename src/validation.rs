//! Request validation.
//!
//! serde settles the shape of each payload (required keys, types, enum
//! membership). The per-field rules are `validator` attributes on the request
//! types in `models`. Each entry point here trims and normalizes a payload,
//! runs its rules and reports every failed rule at once. Rules that span
//! fields or depend on an enum value are checked here too.

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, DeserializeOwned},
};
use serde_json::Value;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::models::{
    CreateInquiryRequest, CreatePropertyRequest, ProfileUpdate, PropertyFilter, PropertyQuery,
    Role, SigninRequest, SignupRequest, UpdatePropertyRequest,
};

pub const MAX_PAGE_SIZE: u32 = 50;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// ValidationIssue
///
/// One failed constraint, reported back to the client under `details`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, TS)]
#[ts(export)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Validated<T> = Result<T, Vec<ValidationIssue>>;

/// Flattens `validator` output into one issue per failed rule, grouped by
/// field. Field names are reported in their camelCase wire form.
pub fn issues_from(errors: &ValidationErrors) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            let field = camel_case(&field);
            failures.iter().map(move |failure| {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", failure.code));
                ValidationIssue::new(field.clone(), message)
            })
        })
        .collect();
    issues.sort_by(|a, b| a.field.cmp(&b.field));
    issues
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn rule_issues<T: Validate>(payload: &T) -> Vec<ValidationIssue> {
    match payload.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => issues_from(&errors),
    }
}

fn finish<T>(payload: T, issues: Vec<ValidationIssue>) -> Validated<T> {
    if issues.is_empty() {
        Ok(payload)
    } else {
        Err(issues)
    }
}

fn trim(value: &mut String) {
    if value.trim().len() != value.len() {
        *value = value.trim().to_string();
    }
}

fn trim_opt(value: &mut Option<String>) {
    if let Some(v) = value {
        trim(v);
    }
}

/// Trims, and turns an empty value into `None`.
fn blank_to_none(value: &mut Option<String>) {
    *value = value
        .take()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
}

fn clean_amenities(amenities: &mut Vec<String>) {
    for amenity in amenities.iter_mut() {
        trim(amenity);
    }
    amenities.retain(|a| !a.is_empty());
}

/// blank_as_none
///
/// Query-string field reader: a missing or blank value is `None`. Anything
/// else is read as a JSON string first (text, enums) and then as a JSON
/// scalar (numbers, booleans).
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    serde_json::from_value(Value::String(raw.to_string()))
        .or_else(|_| serde_json::from_str(raw))
        .map(Some)
        .map_err(|_| de::Error::custom(format!("invalid value '{raw}'")))
}

// --- Auth ---

pub fn validate_signup(mut req: SignupRequest) -> Validated<SignupRequest> {
    trim(&mut req.name);
    req.email = req.email.trim().to_lowercase();
    blank_to_none(&mut req.phone);
    blank_to_none(&mut req.whatsapp);

    let mut issues = rule_issues(&req);
    if req.role == Role::Admin {
        issues.push(ValidationIssue::new(
            "userType",
            "Invalid enum value. Expected 'STUDENT' | 'LANDLORD'",
        ));
    }
    finish(req, issues)
}

pub fn validate_signin(mut req: SigninRequest) -> Validated<SigninRequest> {
    req.email = req.email.trim().to_lowercase();
    let issues = rule_issues(&req);
    finish(req, issues)
}

/// Empty strings leave the corresponding profile field unchanged.
pub fn validate_profile_update(mut update: ProfileUpdate) -> Validated<ProfileUpdate> {
    blank_to_none(&mut update.name);
    blank_to_none(&mut update.phone);
    blank_to_none(&mut update.whatsapp);
    let issues = rule_issues(&update);
    finish(update, issues)
}

// --- Properties ---

pub fn validate_property_create(
    mut req: CreatePropertyRequest,
) -> Validated<CreatePropertyRequest> {
    trim(&mut req.title);
    trim(&mut req.location);
    for field in [
        &mut req.description,
        &mut req.address,
        &mut req.city,
        &mut req.state,
        &mut req.pincode,
        &mut req.whatsapp_number,
    ] {
        trim_opt(field);
    }
    clean_amenities(&mut req.amenities);

    let issues = rule_issues(&req);
    finish(req, issues)
}

/// Same rules as create, applied only to the fields that are present.
pub fn validate_property_update(
    mut patch: UpdatePropertyRequest,
) -> Validated<UpdatePropertyRequest> {
    for field in [
        &mut patch.title,
        &mut patch.location,
        &mut patch.description,
        &mut patch.address,
        &mut patch.city,
        &mut patch.state,
        &mut patch.pincode,
        &mut patch.whatsapp_number,
    ] {
        trim_opt(field);
    }
    if let Some(amenities) = &mut patch.amenities {
        clean_amenities(amenities);
    }

    let issues = rule_issues(&patch);
    finish(patch, issues)
}

/// Turns the listing query into a filter. `page` defaults to 1 and `limit`
/// to 10, clamped to 50.
pub fn validate_property_query(query: PropertyQuery) -> Validated<PropertyFilter> {
    let mut issues = rule_issues(&query);
    if let (Some(min), Some(max)) = (query.min_rent, query.max_rent) {
        if min > max {
            issues.push(ValidationIssue::new(
                "minRent",
                "minRent must not exceed maxRent",
            ));
        }
    }
    if !issues.is_empty() {
        return Err(issues);
    }

    let amenities = query
        .amenities
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(PropertyFilter {
        search: query.search,
        property_type: query.property_type,
        room_type: query.room_type,
        min_rent: query.min_rent,
        max_rent: query.max_rent,
        city: query.city,
        amenities,
        available: query.available,
        verified: query.verified,
        page: query.page.unwrap_or(1),
        limit: query.limit.map_or(DEFAULT_PAGE_SIZE, |l| l.min(MAX_PAGE_SIZE)),
    })
}

// --- Inquiries ---

pub fn validate_inquiry_create(
    mut req: CreateInquiryRequest,
) -> Validated<CreateInquiryRequest> {
    blank_to_none(&mut req.message);
    blank_to_none(&mut req.user_phone);
    blank_to_none(&mut req.user_name);
    blank_to_none(&mut req.user_email);
    req.user_email = req.user_email.map(|e| e.to_lowercase());

    let issues = rule_issues(&req);
    finish(req, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactType, PropertyType, RoomType};
    use axum::{extract::Query, http::Uri};
    use serde_json::json;
    use uuid::Uuid;

    fn fields_of(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.field.as_str()).collect()
    }

    fn parse<T: DeserializeOwned>(body: Value) -> T {
        serde_json::from_value(body).unwrap()
    }

    fn query(uri: &str) -> PropertyQuery {
        let uri: Uri = uri.parse().unwrap();
        Query::<PropertyQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn signup_accepts_a_valid_payload_and_normalizes_email() {
        let data = validate_signup(parse(json!({
            "name": "Asha",
            "email": " Asha@Example.com",
            "password": "secret1",
            "userType": "LANDLORD",
            "phone": "9999999999",
            "whatsapp": ""
        })))
        .unwrap();
        assert_eq!(data.email, "asha@example.com");
        assert_eq!(data.role, Role::Landlord);
        assert_eq!(data.phone.as_deref(), Some("9999999999"));
        assert_eq!(data.whatsapp, None);
    }

    #[test]
    fn signup_reports_every_issue() {
        let issues = validate_signup(parse(json!({
            "name": "A",
            "email": "not-an-email",
            "password": "123",
            "userType": "ADMIN"
        })))
        .unwrap_err();
        let fields = fields_of(&issues);
        for field in ["name", "email", "password", "userType"] {
            assert!(fields.contains(&field), "missing issue for {field}");
        }
    }

    #[test]
    fn malformed_email_domains_are_rejected() {
        for email in ["a@b..com", "a@-x.com", "a b@c.com", "@c.com"] {
            let issues = validate_signin(SigninRequest {
                email: email.into(),
                password: "pw".into(),
            })
            .unwrap_err();
            assert_eq!(fields_of(&issues), vec!["email"], "{email} was accepted");
        }
    }

    #[test]
    fn signin_requires_a_password() {
        let issues = validate_signin(SigninRequest {
            email: "asha@example.com".into(),
            password: String::new(),
        })
        .unwrap_err();
        assert_eq!(issues[0].message, "Password is required");
    }

    #[test]
    fn property_create_applies_defaults() {
        let data = validate_property_create(parse(json!({
            "title": "Sunny flat near campus",
            "rent": 12000,
            "location": "Kothrud",
            "roomType": "ONE_BHK",
            "propertyType": "FLAT"
        })))
        .unwrap();
        assert_eq!(data.rent, 12000);
        assert!(data.amenities.is_empty());
        assert!(!data.smoking && !data.drinking && !data.pets && !data.visitors);
    }

    #[test]
    fn property_create_enforces_lengths_and_ranges() {
        let issues = validate_property_create(parse(json!({
            "title": "  Hut  ",
            "rent": 0,
            "location": "X",
            "roomType": "SINGLE",
            "propertyType": "FLAT",
            "amenities": ["wifi", " "]
        })))
        .unwrap_err();
        assert_eq!(fields_of(&issues), vec!["location", "rent", "title"]);
        assert_eq!(issues[1].message, "Rent must be greater than 0");
    }

    #[test]
    fn unknown_enum_values_fail_to_parse() {
        let parsed = serde_json::from_value::<CreatePropertyRequest>(json!({
            "title": "Palace room",
            "rent": 100,
            "location": "Fort",
            "roomType": "PALACE",
            "propertyType": "FLAT"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn property_update_is_partial_but_keeps_constraints() {
        let patch = validate_property_update(parse(json!({ "rent": 9000 }))).unwrap();
        assert_eq!(patch.rent, Some(9000));
        assert_eq!(patch.title, None);

        let empty = validate_property_update(parse(json!({}))).unwrap();
        assert_eq!(empty, UpdatePropertyRequest::default());

        let issues = validate_property_update(parse(json!({ "title": "abc" }))).unwrap_err();
        assert_eq!(fields_of(&issues), vec!["title"]);
    }

    #[test]
    fn query_parses_filters_and_clamps_limit() {
        let filter = validate_property_query(query(
            "/api/properties?propertyType=FLAT&minRent=5000&maxRent=15000\
             &amenities=wifi,%20parking,&available=true&limit=500&city=",
        ))
        .unwrap();
        assert_eq!(filter.property_type, Some(PropertyType::Flat));
        assert_eq!(filter.min_rent, Some(5000));
        assert_eq!(filter.amenities, vec!["wifi", "parking"]);
        assert_eq!(filter.available, Some(true));
        assert_eq!(filter.limit, MAX_PAGE_SIZE);
        assert_eq!(filter.page, 1);
        assert_eq!(filter.city, None);
    }

    #[test]
    fn query_rejects_out_of_range_values() {
        let issues =
            validate_property_query(query("/api/properties?page=0&minRent=900&maxRent=100"))
                .unwrap_err();
        let fields = fields_of(&issues);
        assert!(fields.contains(&"page"));
        assert!(fields.contains(&"minRent"));
    }

    #[test]
    fn query_rejects_unparsable_values() {
        for bad in ["roomType=CASTLE", "verified=yes", "minRent=abc"] {
            let uri: Uri = format!("/api/properties?{bad}").parse().unwrap();
            assert!(
                Query::<PropertyQuery>::try_from_uri(&uri).is_err(),
                "{bad} was accepted"
            );
        }
        assert_eq!(query("/api/properties?roomType=STUDIO").room_type, Some(RoomType::Studio));
    }

    #[test]
    fn inquiry_checks_the_optional_email() {
        let id = Uuid::new_v4();
        let ok = validate_inquiry_create(parse(json!({
            "propertyId": id.to_string(),
            "contactType": "WHATSAPP",
            "message": "Is it still available?",
            "userName": "  "
        })))
        .unwrap();
        assert_eq!(ok.property_id, id);
        assert_eq!(ok.contact_type, ContactType::Whatsapp);
        assert_eq!(ok.user_name, None);

        let issues = validate_inquiry_create(parse(json!({
            "propertyId": id.to_string(),
            "contactType": "PHONE",
            "userEmail": "bad"
        })))
        .unwrap_err();
        assert_eq!(fields_of(&issues), vec!["userEmail"]);
    }

    #[test]
    fn profile_update_ignores_empty_strings() {
        let update =
            validate_profile_update(parse(json!({ "name": "", "phone": "123" }))).unwrap();
        assert_eq!(update.name, None);
        assert_eq!(update.phone.as_deref(), Some("123"));

        let issues = validate_profile_update(parse(json!({ "name": "Z" }))).unwrap_err();
        assert_eq!(fields_of(&issues), vec!["name"]);
    }

    #[test]
    fn field_names_use_the_wire_casing() {
        assert_eq!(camel_case("user_email"), "userEmail");
        assert_eq!(camel_case("min_rent"), "minRent");
        assert_eq!(camel_case("title"), "title");
    }
}
