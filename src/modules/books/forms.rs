//! Submitted form shapes and the rules that turn them into storable values.
//!
//! Validation never stops at the first problem: every field is checked and the
//! failures come back together in [`FieldErrors`], keyed by field name, so the
//! form can be redisplayed with a message next to each offending input.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use super::models::{NewBook, Rating};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_DATE: &str = "Not a valid date value.";
pub const INVALID_CHOICE: &str = "Not a valid choice.";

/// Format `read_year` is stored in, e.g. `12-Jan-2020`.
pub const READ_DATE_FORMAT: &str = "%d-%b-%Y";

/// Accepted input formats: what an `<input type="date">` posts, and the
/// stored format itself.
const READ_DATE_INPUTS: &[&str] = &["%Y-%m-%d", READ_DATE_FORMAT];

/// Raw creation form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookForm {
    pub book_name: String,
    pub read_year: String,
    pub book_author: String,
    pub rating: String,
}

/// Raw rating-update form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RatingForm {
    pub rating: String,
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `field: message` lines, in field order.
    pub fn messages(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(field, msgs)| msgs.iter().map(move |m| format!("{field}: {m}")))
            .collect()
    }
}

impl BookForm {
    pub fn validate(&self) -> Result<NewBook, FieldErrors> {
        let mut errors = FieldErrors::default();

        let title = required_text(&self.book_name, "book_name", &mut errors);
        let read_year = read_date(&self.read_year, &mut errors);
        let author = required_text(&self.book_author, "book_author", &mut errors);
        let rating = rating(&self.rating, &mut errors);

        match (title, read_year, author, rating) {
            (Some(title), Some(read_year), Some(author), Some(rating)) if errors.is_empty() => {
                Ok(NewBook {
                    title,
                    author,
                    read_year,
                    rating,
                })
            }
            _ => Err(errors),
        }
    }
}

impl RatingForm {
    pub fn validate(&self) -> Result<Rating, FieldErrors> {
        let mut errors = FieldErrors::default();
        rating(&self.rating, &mut errors).ok_or(errors)
    }
}

fn required_text(raw: &str, field: &'static str, errors: &mut FieldErrors) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    Some(value.to_string())
}

fn read_date(raw: &str, errors: &mut FieldErrors) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add("read_year", REQUIRED);
        return None;
    }

    match parse_read_date(value) {
        Some(date) => Some(date.format(READ_DATE_FORMAT).to_string()),
        None => {
            errors.add("read_year", INVALID_DATE);
            None
        }
    }
}

fn parse_read_date(value: &str) -> Option<NaiveDate> {
    READ_DATE_INPUTS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Only the exact option values `1`..`10` are valid choices.
fn rating(raw: &str, errors: &mut FieldErrors) -> Option<Rating> {
    if raw.trim().is_empty() {
        errors.add("rating", REQUIRED);
        return None;
    }

    let chosen = Rating::all().find(|rating| rating.to_string() == raw);
    if chosen.is_none() {
        errors.add("rating", INVALID_CHOICE);
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, date: &str, author: &str, rating: &str) -> BookForm {
        BookForm {
            book_name: name.to_string(),
            read_year: date.to_string(),
            book_author: author.to_string(),
            rating: rating.to_string(),
        }
    }

    #[test]
    fn valid_form_is_normalized() {
        let book = form("  Dune ", "2020-01-12", " Herbert", "9")
            .validate()
            .unwrap();

        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Herbert");
        assert_eq!(book.read_year, "12-Jan-2020");
        assert_eq!(book.rating.get(), 9);
    }

    #[test]
    fn stored_date_format_is_accepted_as_input() {
        let book = form("Dune", "12-Jan-2020", "Herbert", "9").validate().unwrap();
        assert_eq!(book.read_year, "12-Jan-2020");
    }

    #[test]
    fn every_failing_field_is_reported() {
        let errors = form(" ", "", "", "").validate().unwrap_err();

        for field in ["book_name", "read_year", "book_author", "rating"] {
            assert_eq!(errors.get(field), [REQUIRED.to_string()], "{field}");
        }
        assert_eq!(errors.messages().len(), 4);
    }

    #[test]
    fn bad_date_and_rating_are_distinguished_from_missing() {
        let errors = form("Dune", "2020-13-45", "Herbert", "eleven")
            .validate()
            .unwrap_err();

        assert_eq!(errors.get("read_year"), [INVALID_DATE.to_string()]);
        assert_eq!(errors.get("rating"), [INVALID_CHOICE.to_string()]);
        assert!(errors.get("book_name").is_empty());
    }

    #[test]
    fn only_exact_rating_choices_are_accepted() {
        for raw in ["0", "11", "-1", "255", "256", "7.5", "+5", "05", "010", " 5"] {
            let errors = RatingForm {
                rating: raw.to_string(),
            }
            .validate()
            .unwrap_err();
            assert_eq!(errors.get("rating"), [INVALID_CHOICE.to_string()], "{raw}");

            assert!(form("Dune", "2020-01-12", "Herbert", raw).validate().is_err());
        }
    }

    #[test]
    fn rating_form_accepts_bounds() {
        assert_eq!(RatingForm { rating: "1".into() }.validate().unwrap().get(), 1);
        assert_eq!(RatingForm { rating: "10".into() }.validate().unwrap().get(), 10);
    }
}
