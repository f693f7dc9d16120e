//! HTML pages for the shelf.

use maud::{html, Markup, DOCTYPE};

use super::forms::{BookForm, FieldErrors};
use super::models::{Book, Rating};

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href=(BOOTSTRAP_CSS);
            }
            body {
                main class="container py-4" { (body) }
            }
        }
    }
}

pub fn index(books: &[Book]) -> Markup {
    layout(
        "My Library",
        html! {
            h1 { "My Library" }
            @if books.is_empty() {
                p class="text-muted" { "Library is empty." }
            } @else {
                table class="table" {
                    thead {
                        tr {
                            th { "Title" }
                            th { "Author" }
                            th { "Read" }
                            th { "Rating" }
                            th {}
                        }
                    }
                    tbody {
                        @for book in books {
                            tr id=(format!("book-{}", book.id)) {
                                td { (book.title) }
                                td { (book.author) }
                                td { (book.read_year) }
                                td class="rating" { (book.rating) "/10" }
                                td {
                                    a href=(format!("/edit/{}", book.id)) { "Edit Rating" }
                                    " "
                                    a href=(format!("/delete/{}", book.id)) { "Delete" }
                                }
                            }
                        }
                    }
                }
            }
            a class="btn btn-primary" href="/add" { "Add New Book" }
        },
    )
}

fn field_errors(errors: &FieldErrors, field: &str) -> Markup {
    html! {
        @for message in errors.get(field) {
            div class="invalid-feedback d-block" { (message) }
        }
    }
}

fn rating_select(errors: &FieldErrors, label: &str, selected: Option<&str>) -> Markup {
    html! {
        div class="mb-3" {
            label class="form-label" for="rating" { (label) }
            select class="form-select" id="rating" name="rating" {
                @for rating in Rating::all() {
                    @let value = rating.to_string();
                    option value=(value) selected[selected == Some(value.as_str())] { (value) }
                }
            }
            (field_errors(errors, "rating"))
        }
    }
}

/// Creation form. `form` holds what was submitted so it survives a redisplay.
pub fn add_form(form: &BookForm, errors: &FieldErrors, error_message: Option<&str>) -> Markup {
    let selected = (!form.rating.is_empty()).then_some(form.rating.as_str());
    layout(
        "Add Book",
        html! {
            h1 { "Add Book" }
            @if let Some(message) = error_message {
                div class="alert alert-danger" role="alert" { (message) }
            }
            form method="post" action="/add" novalidate {
                div class="mb-3" {
                    label class="form-label" for="book_name" { "Book Name" }
                    input class="form-control" type="text" id="book_name" name="book_name"
                        value=(form.book_name) required;
                    (field_errors(errors, "book_name"))
                }
                div class="mb-3" {
                    label class="form-label" for="read_year" { "Read Year" }
                    input class="form-control" type="date" id="read_year" name="read_year"
                        value=(form.read_year) required;
                    (field_errors(errors, "read_year"))
                }
                div class="mb-3" {
                    label class="form-label" for="book_author" { "Book Author" }
                    input class="form-control" type="text" id="book_author" name="book_author"
                        value=(form.book_author) required;
                    (field_errors(errors, "book_author"))
                }
                (rating_select(errors, "Rating", selected))
                button class="btn btn-primary" type="submit" { "Add Book!" }
            }
            p class="mt-3" { a href="/" { "Back to library" } }
        },
    )
}

/// Rating form. The current rating is not preselected.
pub fn edit_form(book: &Book, errors: &FieldErrors) -> Markup {
    layout(
        "Edit Rating",
        html! {
            h1 { "Edit Rating" }
            p { "Book: " strong { (book.title) } }
            form method="post" action=(format!("/edit/{}", book.id)) novalidate {
                (rating_select(errors, "New Rating", None))
                button class="btn btn-primary" type="submit" { "Update Book Rating!" }
            }
            p class="mt-3" { a href="/" { "Back to library" } }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book {
            id: 3,
            title: "Dune <1965>".to_string(),
            author: "Herbert".to_string(),
            read_year: "12-Jan-2020".to_string(),
            rating: Rating::new(9).unwrap(),
        }
    }

    #[test]
    fn index_lists_books_with_links() {
        let page = index(&[dune()]).into_string();
        assert!(page.contains("Dune &lt;1965&gt;"));
        assert!(page.contains("href=\"/edit/3\""));
        assert!(page.contains("href=\"/delete/3\""));
        assert!(page.contains("9/10"));
    }

    #[test]
    fn empty_index_says_so() {
        assert!(index(&[]).into_string().contains("Library is empty."));
    }

    #[test]
    fn add_form_keeps_submitted_values_and_errors() {
        let form = BookForm {
            book_name: "Dune".to_string(),
            rating: "4".to_string(),
            ..BookForm::default()
        };
        let mut errors = FieldErrors::default();
        errors.add("book_author", "This field is required.");

        let page = add_form(&form, &errors, Some("A book with that title already exists!"))
            .into_string();
        assert!(page.contains("value=\"Dune\""));
        assert!(page.contains("option value=\"4\" selected"));
        assert!(page.contains("This field is required."));
        assert!(page.contains("A book with that title already exists!"));
    }

    #[test]
    fn edit_form_does_not_preselect_current_rating() {
        let page = edit_form(&dune(), &FieldErrors::default()).into_string();
        assert!(page.contains("action=\"/edit/3\""));
        assert!(!page.contains("selected"));
    }
}
