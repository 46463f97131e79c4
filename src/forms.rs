use axum::{body::Bytes, extract::Multipart};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

// User-facing validation messages. Fixed strings: the front end matches on
// them when rendering errors next to each field.
pub const REQUIRED_MESSAGE: &str = "value required";
pub const NUMERIC_MESSAGE: &str = "value must be a whole number";
pub const ISBN_FORMAT_MESSAGE: &str = "ISBN format invalid";
pub const SALE_DATE_FORMAT_MESSAGE: &str = "sale date format invalid";

// X-XXXX-XXXX-X where X is alphanumeric. No checksum semantics.
static ISBN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]-[A-Za-z0-9]{4}-[A-Za-z0-9]{4}-[A-Za-z0-9]$")
        .expect("ISBN pattern compiles")
});

// YYYY-MM-DD by digit class only: month "19" or day "39" still pass. This
// is a format check, not a calendar validator; the lenient grammar is
// pinned by tests.
static SALE_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-2][0-9]{3}-[0-1][0-9]-[0-3][0-9]$").expect("sale date pattern compiles")
});

/// FieldError
///
/// A structured rejection of one form field: the field's wire name plus a
/// fixed user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// UploadedImage
///
/// Opaque handle to the bytes of an uploaded cover image. The form holds
/// the bytes as submitted; storage decides where they go.
#[derive(Debug, Clone, Default)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// BookRegistrationForm
///
/// The raw book registration submission, exactly as it arrived in the
/// multipart body. Numeric fields stay strings here; they are parsed only
/// after the rule list has accepted them.
#[derive(Debug, Clone, Default)]
pub struct BookRegistrationForm {
    pub name: String,
    pub author: String,
    pub publisher: String,
    pub price: String,
    pub isbncode: String,
    pub saledate: String,
    pub explanation: String,
    pub stock: String,
    pub image: Option<UploadedImage>,
}

/// ValidatedBook
///
/// The outcome of a fully accepted submission. A form either becomes one of
/// these or a list of field errors; there is no partially-valid state.
#[derive(Debug, Clone)]
pub struct ValidatedBook {
    pub name: String,
    pub author: String,
    pub publisher: String,
    pub price: i32,
    pub isbncode: String,
    pub saledate: String,
    pub explanation: String,
    pub stock: i32,
    pub image: Option<UploadedImage>,
}

/// One row of the validation table: which field, what to report, and the
/// predicate that must hold. Rules are data so the complete contract is
/// reviewable in one place, mirroring the access rule table.
struct FieldRule {
    field: &'static str,
    message: &'static str,
    passes: fn(&BookRegistrationForm) -> bool,
}

/// The fixed rule list, in submission field order. Format rules
/// treat an empty value as passing so that an empty field reports exactly
/// one error (the required one), while every field is still checked; no
/// rule short-circuits another field's.
fn field_rules() -> [FieldRule; 12] {
    [
        FieldRule {
            field: "name",
            message: REQUIRED_MESSAGE,
            passes: |f| !f.name.is_empty(),
        },
        FieldRule {
            field: "author",
            message: REQUIRED_MESSAGE,
            passes: |f| !f.author.is_empty(),
        },
        FieldRule {
            field: "publisher",
            message: REQUIRED_MESSAGE,
            passes: |f| !f.publisher.is_empty(),
        },
        FieldRule {
            field: "price",
            message: REQUIRED_MESSAGE,
            passes: |f| !f.price.is_empty(),
        },
        FieldRule {
            field: "price",
            message: NUMERIC_MESSAGE,
            passes: |f| f.price.is_empty() || f.price.parse::<i32>().is_ok(),
        },
        FieldRule {
            field: "isbncode",
            message: REQUIRED_MESSAGE,
            passes: |f| !f.isbncode.is_empty(),
        },
        FieldRule {
            field: "isbncode",
            message: ISBN_FORMAT_MESSAGE,
            passes: |f| f.isbncode.is_empty() || ISBN_PATTERN.is_match(&f.isbncode),
        },
        FieldRule {
            field: "saledate",
            message: REQUIRED_MESSAGE,
            passes: |f| !f.saledate.is_empty(),
        },
        FieldRule {
            field: "saledate",
            message: SALE_DATE_FORMAT_MESSAGE,
            passes: |f| f.saledate.is_empty() || SALE_DATE_PATTERN.is_match(&f.saledate),
        },
        FieldRule {
            field: "explanation",
            message: REQUIRED_MESSAGE,
            passes: |f| !f.explanation.is_empty(),
        },
        FieldRule {
            field: "stock",
            message: REQUIRED_MESSAGE,
            passes: |f| !f.stock.is_empty(),
        },
        FieldRule {
            field: "stock",
            message: NUMERIC_MESSAGE,
            passes: |f| f.stock.is_empty() || f.stock.parse::<i32>().is_ok(),
        },
    ]
}

impl BookRegistrationForm {
    /// from_multipart
    ///
    /// Collects the fixed field set from a multipart body. Unknown parts are
    /// drained and ignored. The image part is optional: a missing part, an
    /// empty file input, or a part whose bytes cannot be read all leave the
    /// image absent rather than failing the request.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, String> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "imageFile" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(data) if !data.is_empty() && !file_name.is_empty() => {
                        form.image = Some(UploadedImage {
                            file_name,
                            content_type,
                            data,
                        });
                    }
                    // Empty or unreadable upload: absent optional field.
                    _ => form.image = None,
                }
                continue;
            }

            let value = field.text().await.map_err(|e| e.to_string())?;
            match name.as_str() {
                "name" => form.name = value,
                "author" => form.author = value,
                "publisher" => form.publisher = value,
                "price" => form.price = value,
                "isbncode" => form.isbncode = value,
                "saledate" => form.saledate = value,
                "explanation" => form.explanation = value,
                "stock" => form.stock = value,
                _ => {}
            }
        }

        Ok(form)
    }

    /// validate
    ///
    /// Evaluates the whole rule list (every field is checked in one pass so
    /// all violations come back together) and returns either the parsed
    /// book or the ordered error list.
    pub fn validate(self) -> Result<ValidatedBook, Vec<FieldError>> {
        let errors: Vec<FieldError> = field_rules()
            .iter()
            .filter(|rule| !(rule.passes)(&self))
            .map(|rule| FieldError::new(rule.field, rule.message))
            .collect();

        if !errors.is_empty() {
            return Err(errors);
        }

        let price = self
            .price
            .parse::<i32>()
            .map_err(|_| vec![FieldError::new("price", NUMERIC_MESSAGE)])?;
        let stock = self
            .stock
            .parse::<i32>()
            .map_err(|_| vec![FieldError::new("stock", NUMERIC_MESSAGE)])?;

        Ok(ValidatedBook {
            name: self.name,
            author: self.author,
            publisher: self.publisher,
            price,
            isbncode: self.isbncode,
            saledate: self.saledate,
            explanation: self.explanation,
            stock,
            image: self.image,
        })
    }
}
