//! Request handlers for the shelf pages.
//!
//! Each handler performs at most one read-then-write against the repository and
//! either renders a page or redirects back to the list.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use bookshelf_http::AppError;

use super::forms::{BookForm, FieldErrors, RatingForm};
use super::models::{Book, BookId};
use super::repository::{BookRepository, RepositoryError};
use super::views;

pub const DUPLICATE_TITLE: &str = "A book with that title already exists!";

pub type SharedRepository = Arc<dyn BookRepository>;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => AppError::not_found(format!("Book {id} not found")),
            RepositoryError::DuplicateTitle(title) => {
                AppError::conflict(vec![format!("title: {title}")], DUPLICATE_TITLE)
            }
            RepositoryError::Constraint(message) => {
                AppError::conflict(vec![message], "The book could not be saved")
            }
            RepositoryError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

fn redirect_home() -> Redirect {
    Redirect::to("/")
}

/// Ids that do not parse as a `BookId` are treated as missing books.
fn book_id(path: Result<Path<BookId>, PathRejection>) -> Result<BookId, AppError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "unparseable book id");
        AppError::not_found("Book not found")
    })
}

fn form_body<T>(form: Result<Form<T>, FormRejection>) -> Result<T, AppError> {
    form.map(|Form(body)| body)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

async fn find_book(repo: &SharedRepository, id: BookId) -> Result<Book, AppError> {
    repo.get_by_id(id)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(id).into())
}

/// `GET /`
pub async fn list_books(State(repo): State<SharedRepository>) -> Result<Html<String>, AppError> {
    let books = repo.list_all().await?;
    Ok(Html(views::index(&books).into_string()))
}

/// `GET /add`
pub async fn new_book_form() -> Html<String> {
    Html(views::add_form(&BookForm::default(), &FieldErrors::default(), None).into_string())
}

/// `POST /add`
pub async fn create_book(
    State(repo): State<SharedRepository>,
    form: Result<Form<BookForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = form_body(form)?;
    let new_book = match form.validate() {
        Ok(book) => book,
        Err(errors) => {
            tracing::debug!(errors = ?errors.messages(), "book form rejected");
            let page = views::add_form(&form, &errors, None);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page.into_string())).into_response());
        }
    };

    let duplicate = || {
        let page = views::add_form(&form, &FieldErrors::default(), Some(DUPLICATE_TITLE));
        (StatusCode::CONFLICT, Html(page.into_string())).into_response()
    };

    if repo.title_exists(&new_book.title).await? {
        tracing::debug!(title = %new_book.title, "duplicate title rejected");
        return Ok(duplicate());
    }

    match repo.insert(new_book).await {
        Ok(_) => Ok(redirect_home().into_response()),
        Err(RepositoryError::DuplicateTitle(title)) => {
            tracing::debug!(title = %title, "duplicate title lost insert race");
            Ok(duplicate())
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /edit/{id}`
pub async fn edit_rating_form(
    State(repo): State<SharedRepository>,
    id: Result<Path<BookId>, PathRejection>,
) -> Result<Html<String>, AppError> {
    let book = find_book(&repo, book_id(id)?).await?;
    Ok(Html(views::edit_form(&book, &FieldErrors::default()).into_string()))
}

/// `POST /edit/{id}`
pub async fn update_rating(
    State(repo): State<SharedRepository>,
    id: Result<Path<BookId>, PathRejection>,
    form: Result<Form<RatingForm>, FormRejection>,
) -> Result<Response, AppError> {
    let book = find_book(&repo, book_id(id)?).await?;
    let form = form_body(form)?;

    let rating = match form.validate() {
        Ok(rating) => rating,
        Err(errors) => {
            let page = views::edit_form(&book, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page.into_string())).into_response());
        }
    };

    repo.update_rating(book.id, rating).await?;
    Ok(redirect_home().into_response())
}

/// `GET /delete/{id}`. Deleting a missing book is a no-op.
pub async fn delete_book(
    State(repo): State<SharedRepository>,
    id: Result<Path<BookId>, PathRejection>,
) -> Result<Redirect, AppError> {
    repo.delete(book_id(id)?).await?;
    Ok(redirect_home())
}
