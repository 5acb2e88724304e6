//! Declarative validation of the listing draft
//!
//! Every field is checked against a fixed rule table; each field
//! surfaces the first violated rule's message. Validation is a pure
//! function of the current field values and is re-run on every change.

use std::fmt;

use super::types::ListingForm;

/// A draft field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Model,
    Year,
    Km,
    Price,
    City,
    Whatsapp,
    Description,
}

impl Field {
    /// All draft fields, in display order
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Model,
        Field::Year,
        Field::Km,
        Field::Price,
        Field::City,
        Field::Whatsapp,
        Field::Description,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Model => "model",
            Field::Year => "year",
            Field::Km => "km",
            Field::Price => "price",
            Field::City => "city",
            Field::Whatsapp => "whatsapp",
            Field::Description => "description",
        };
        write!(f, "{}", name)
    }
}

/// A single rule a field value must satisfy
#[derive(Debug, Clone, Copy)]
enum Check {
    /// The value must be non-empty
    Required,

    /// The value must be ASCII digits only, with a length in range
    Digits { min: usize, max: usize },
}

impl Check {
    fn passes(&self, value: &str) -> bool {
        match self {
            Check::Required => !value.is_empty(),
            Check::Digits { min, max } => {
                (*min..=*max).contains(&value.len())
                    && value.chars().all(|c| c.is_ascii_digit())
            }
        }
    }
}

/// One entry of the rule table
struct Rule {
    field: Field,
    check: Check,
    message: &'static str,
}

/// The whole-form validation schema
///
/// Rules are evaluated top to bottom per field; the first failure wins.
const SCHEMA: &[Rule] = &[
    Rule { field: Field::Name, check: Check::Required, message: "The name is required" },
    Rule { field: Field::Model, check: Check::Required, message: "The model is required" },
    Rule { field: Field::Year, check: Check::Required, message: "The year is required" },
    Rule { field: Field::Km, check: Check::Required, message: "The mileage is required" },
    Rule { field: Field::Price, check: Check::Required, message: "The price is required" },
    Rule { field: Field::City, check: Check::Required, message: "The city is required" },
    Rule { field: Field::Whatsapp, check: Check::Required, message: "The phone is required" },
    Rule {
        field: Field::Whatsapp,
        check: Check::Digits { min: 11, max: 12 },
        message: "Invalid phone number",
    },
    Rule {
        field: Field::Description,
        check: Check::Required,
        message: "The description is required",
    },
];

/// A violated rule for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    /// The field that failed
    pub field: Field,

    /// Human-readable message of the first violated rule
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All current field errors of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// The individual field errors
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// The current error for one field, if any
    pub fn for_field(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl ListingForm {
    fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Model => &self.model,
            Field::Year => &self.year,
            Field::Km => &self.km,
            Field::Price => &self.price,
            Field::City => &self.city,
            Field::Whatsapp => &self.whatsapp,
            Field::Description => &self.description,
        }
    }

    /// The first violated rule for one field, if any
    pub fn validate_field(&self, field: Field) -> Option<FieldError> {
        SCHEMA
            .iter()
            .filter(|rule| rule.field == field)
            .find(|rule| !rule.check.passes(self.value(field)))
            .map(|rule| FieldError {
                field: rule.field,
                message: rule.message,
            })
    }

    /// Validate the whole draft against the rule table
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let errors: Vec<FieldError> = Field::ALL
            .iter()
            .filter_map(|field| self.validate_field(*field))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Whether the whole draft currently passes validation
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
