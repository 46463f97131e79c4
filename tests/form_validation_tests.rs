use stock_portal::forms::{
    BookRegistrationForm, ISBN_FORMAT_MESSAGE, NUMERIC_MESSAGE, REQUIRED_MESSAGE,
    SALE_DATE_FORMAT_MESSAGE,
};

/// A submission that satisfies every rule.
fn filled_form() -> BookRegistrationForm {
    BookRegistrationForm {
        name: "Practical Rust Web Services".to_string(),
        author: "M. Kitaoka".to_string(),
        publisher: "Gihyo Press".to_string(),
        price: "2980".to_string(),
        isbncode: "4-7741-9185-9".to_string(),
        saledate: "2023-01-15".to_string(),
        explanation: "A hands-on introduction.".to_string(),
        stock: "12".to_string(),
        image: None,
    }
}

#[test]
fn fully_valid_form_is_accepted() {
    let book = filled_form().validate().expect("form should be accepted");

    assert_eq!(book.name, "Practical Rust Web Services");
    assert_eq!(book.price, 2980);
    assert_eq!(book.stock, 12);
    assert!(book.image.is_none());
}

#[test]
fn empty_form_reports_one_error_per_required_field() {
    let errors = BookRegistrationForm::default()
        .validate()
        .expect_err("empty form must be rejected");

    // One error per required field, in declared field order, none for the
    // optional image.
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "name",
            "author",
            "publisher",
            "price",
            "isbncode",
            "saledate",
            "explanation",
            "stock"
        ]
    );
    assert!(errors.iter().all(|e| e.message == REQUIRED_MESSAGE));
}

#[test]
fn conformant_isbn_produces_no_isbn_error() {
    let mut form = filled_form();
    form.isbncode = "A-BCDE-FGHI-J".to_string();

    assert!(form.validate().is_ok());
}

#[test]
fn malformed_isbn_produces_exactly_the_format_error() {
    let mut form = filled_form();
    form.isbncode = "ABCDEFGHI".to_string();

    let errors = form.validate().expect_err("bad ISBN must be rejected");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "isbncode");
    assert_eq!(errors[0].message, ISBN_FORMAT_MESSAGE);
}

#[test]
fn conformant_sale_date_produces_no_date_error() {
    let mut form = filled_form();
    form.saledate = "2023-01-15".to_string();

    assert!(form.validate().is_ok());
}

#[test]
fn unpadded_sale_date_produces_the_format_error() {
    let mut form = filled_form();
    form.saledate = "23-1-15".to_string();

    let errors = form.validate().expect_err("short date must be rejected");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "saledate");
    assert_eq!(errors[0].message, SALE_DATE_FORMAT_MESSAGE);
}

#[test]
fn impossible_but_pattern_valid_dates_are_accepted() {
    // The date grammar checks digit classes only; month 19 and day 39 pass.
    // The lenient grammar is pinned here on purpose: tightening it would be
    // a behavior change for existing clients.
    let mut form = filled_form();
    form.saledate = "2023-19-39".to_string();

    assert!(form.validate().is_ok());
}

#[test]
fn empty_pattern_fields_report_only_the_required_error() {
    let mut form = filled_form();
    form.isbncode = String::new();
    form.saledate = String::new();

    let errors = form.validate().expect_err("empty fields must be rejected");
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e.message == REQUIRED_MESSAGE));
}

#[test]
fn non_numeric_price_reports_a_single_numeric_error() {
    let mut form = filled_form();
    form.price = "twelve".to_string();

    let errors = form.validate().expect_err("non-numeric price rejected");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "price");
    assert_eq!(errors[0].message, NUMERIC_MESSAGE);
}

#[test]
fn negative_stock_is_accepted() {
    // The lower bound is implied but not enforced.
    let mut form = filled_form();
    form.stock = "-3".to_string();

    let book = form.validate().expect("negative stock passes validation");
    assert_eq!(book.stock, -3);
}

#[test]
fn all_violations_are_reported_in_one_pass() {
    let mut form = filled_form();
    form.name = String::new();
    form.price = "abc".to_string();
    form.isbncode = "nope".to_string();

    let errors = form.validate().expect_err("mixed violations rejected");
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["name", "price", "isbncode"]);
}
