use bookstore_dal::book::BookRepository;

use crate::state::AppState;
#[allow(unused_imports)]
use axum::routing::{delete, get, post, put};

crate::repository_from_request!(BookRepository);

pub mod crud_api {
    use axum::{Json, extract::Path, response::IntoResponse};
    use bookstore_dal::book::{BookRepository, CreateBook, UpdateBook};
    use http::StatusCode;

    use crate::error::ApiResult;
    use crate::payload::Payload;

    pub async fn list(repository: BookRepository) -> ApiResult<impl IntoResponse> {
        let books = repository.list_all().await?;
        Ok((StatusCode::OK, Json(books)))
    }

    pub async fn get(
        Path(id): Path<i64>,
        repository: BookRepository,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.get(id).await?;

        Ok((StatusCode::OK, Json(record)))
    }

    // The original service replied 200 to creation rather than 201, kept
    // for wire compatibility.
    pub async fn create(
        repository: BookRepository,
        Payload(payload): Payload<CreateBook>,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.create(payload).await?;

        Ok((StatusCode::OK, Json(record)))
    }

    /// Merge-then-save: read the stored record, overlay the non-empty
    /// fields of the payload, write the combined result back.
    pub async fn update(
        Path(id): Path<i64>,
        repository: BookRepository,
        Payload(payload): Payload<UpdateBook>,
    ) -> ApiResult<impl IntoResponse> {
        let mut record = repository.get(id).await?;
        record.merge(payload);
        let record = repository.update(record).await?;

        Ok((StatusCode::OK, Json(record)))
    }

    /// Delete is a success even for an absent id, the response is then a
    /// zero-valued book.
    pub async fn delete(
        Path(id): Path<i64>,
        repository: BookRepository,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.delete(id).await?;

        Ok((StatusCode::OK, Json(record)))
    }
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", post(crud_api::create).get(crud_api::list))
        .route(
            "/{id}",
            get(crud_api::get)
                .delete(crud_api::delete)
                .put(crud_api::update),
        )
}
