// src/api/sow.rs
use super::{json_response, read_json};
use crate::db::{NewSow, SowRepository};
use crate::error::ApiError;
use hyper::{Body, Response, StatusCode};
use serde_json::json;

const SOW_NOT_FOUND: &str = "SoW not found";

pub async fn list(repo: &dyn SowRepository) -> Result<Response<Body>, ApiError> {
    let rows = repo.list().await?;
    Ok(json_response(StatusCode::OK, &rows))
}

pub async fn create(repo: &dyn SowRepository, body: Body) -> Result<Response<Body>, ApiError> {
    let new: NewSow = read_json(body).await?;
    if new.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let row = repo.create(new).await?;
    Ok(json_response(StatusCode::OK, &row))
}

pub async fn get(repo: &dyn SowRepository, raw_id: &str) -> Result<Response<Body>, ApiError> {
    let id = parse_id(raw_id)?;
    match repo.get(id).await? {
        Some(row) => Ok(json_response(StatusCode::OK, &row)),
        None => Err(ApiError::NotFound(SOW_NOT_FOUND)),
    }
}

pub async fn delete(repo: &dyn SowRepository, raw_id: &str) -> Result<Response<Body>, ApiError> {
    let id = parse_id(raw_id)?;
    if repo.delete(id).await? {
        Ok(json_response(StatusCode::OK, &json!({ "deleted": id })))
    } else {
        Err(ApiError::NotFound(SOW_NOT_FOUND))
    }
}

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid SoW id: {:?}", raw)))
}
