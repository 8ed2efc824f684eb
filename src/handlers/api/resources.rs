use axum::{extract::Path, Json};

use crate::error::AppError;
use crate::resources::{describe, ResourceDescriptor};

#[utoipa::path(
    get,
    path = "/api/resources/{slug}/schema",
    tag = "resources",
    params(("slug" = String, Path, description = "conferences, venues, speakers, talks or attendees")),
    responses(
        (status = 200, description = "Form, table and infolist descriptors of the resource"),
        (status = 404, description = "Unknown resource")
    )
)]
pub async fn schema(Path(slug): Path<String>) -> Result<Json<ResourceDescriptor>, AppError> {
    describe(&slug).map(Json).ok_or(AppError::NotFound("Resource"))
}
