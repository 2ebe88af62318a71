//! Contact and delivery details collected on the second checkout step.

use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

/// An email address of the basic `local@domain.tld` shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if EMAIL_PATTERN.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ValidationError::InvalidEmail)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw form input as typed by the customer. Nothing here is trusted until
/// [`DeliveryForm::validate`] succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl DeliveryForm {
    /// Checks every required field, then the email shape.
    ///
    /// Missing fields are reported together, by name, before the email is
    /// looked at.
    pub fn validate(&self) -> Result<DeliveryInfo, ValidationError> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address1", &self.address1),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("country", &self.country),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let email = Email::parse(&self.email)?;
        let address2 = self.address2.trim();

        Ok(DeliveryInfo {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email,
            phone: self.phone.trim().to_owned(),
            address1: self.address1.trim().to_owned(),
            address2: (!address2.is_empty()).then(|| address2.to_owned()),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            postal_code: self.zip.trim().to_owned(),
            country: self.country.trim().to_owned(),
        })
    }
}

/// Validated delivery details. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryInfo {
    first_name: String,
    last_name: String,
    email: Email,
    phone: String,
    address1: String,
    address2: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    country: String,
}

impl DeliveryInfo {
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Street lines, skipping the optional second line when blank.
    pub fn address_lines(&self) -> Vec<String> {
        std::iter::once(self.address1.clone())
            .chain(self.address2.clone())
            .collect()
    }

    /// Address as printed on the review step.
    pub fn postal_address(&self) -> Vec<String> {
        let mut lines = self.address_lines();
        lines.push(format!("{}, {} {}", self.city, self.state, self.postal_code));
        lines.push(self.country.clone());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> DeliveryForm {
        DeliveryForm {
            first_name: "Aoife".into(),
            last_name: "Byrne".into(),
            email: "a@b.co".into(),
            phone: "+353 1 555 0101".into(),
            address1: "12 Main Street".into(),
            address2: String::new(),
            city: "Galway".into(),
            state: "Connacht".into(),
            zip: "H91".into(),
            country: "IE".into(),
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(Email::parse("a@b.co").is_ok());
        assert!(Email::parse("user.name+tag@example.co.uk").is_ok());
        assert_eq!(Email::parse("not-an-email"), Err(ValidationError::InvalidEmail));
        assert!(Email::parse("a@b").is_err());
        assert!(Email::parse("a b@c.io").is_err());
        assert!(Email::parse("@b.co").is_err());
    }

    #[test]
    fn test_validate_complete_form() {
        let info = complete_form().validate().unwrap();
        assert_eq!(info.full_name(), "Aoife Byrne");
        assert_eq!(info.email().as_str(), "a@b.co");
        assert_eq!(info.address_lines(), vec!["12 Main Street".to_string()]);
    }

    #[test]
    fn test_validate_reports_missing_fields_by_name() {
        let form = DeliveryForm {
            city: "  ".into(),
            phone: String::new(),
            ..complete_form()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingFields(vec!["phone", "city"]))
        );
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let form = DeliveryForm {
            email: "not-an-email".into(),
            ..complete_form()
        };
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_postal_address_includes_optional_line() {
        let form = DeliveryForm {
            address2: "Apt 4".into(),
            ..complete_form()
        };
        let info = form.validate().unwrap();
        assert_eq!(
            info.postal_address(),
            vec![
                "12 Main Street".to_string(),
                "Apt 4".to_string(),
                "Galway, Connacht H91".to_string(),
                "IE".to_string(),
            ]
        );
    }

    #[test]
    fn test_form_deserializes_camel_case() {
        let json = r#"{"firstName":"Aoife","zip":"H91","address2":"Apt 4"}"#;
        let form: DeliveryForm = serde_json::from_str(json).unwrap();
        assert_eq!(form.first_name, "Aoife");
        assert_eq!(form.zip, "H91");
        assert!(form.city.is_empty());
    }
}
