use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::Validate;

/// JSON body that has passed its `validator` rules.
///
/// Any decode failure (bad syntax, missing field, wrong content type) is a
/// `BadRequest`; rule failures surface as `ValidationError`.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e.body_text()))
            })?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Query string whose decode failures render as a JSON `BadRequest`.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Query parse error: {}", e.body_text()))
            })?;

        Ok(QueryParams(value))
    }
}

/// Parses a path id into an `ObjectId`, ignoring surrounding whitespace.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("The id is invalid")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Flags {
        completed: Option<bool>,
    }

    async fn query(uri: &str) -> Result<QueryParams<Flags>, AppError> {
        let (mut parts, _) = Request::builder()
            .uri(uri)
            .body(axum::body::Body::empty())
            .unwrap()
            .into_parts();
        QueryParams::<Flags>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn query_params_decode_optional_flags() {
        assert_eq!(query("/todo/").await.unwrap().0.completed, None);
        assert_eq!(
            query("/todo/?completed=true").await.unwrap().0.completed,
            Some(true)
        );
    }

    #[tokio::test]
    async fn malformed_query_is_bad_request() {
        let err = query("/todo/?completed=maybe").await.err().unwrap();
        assert!(matches!(&err, AppError::BadRequest(_)));
        assert!(err.to_string().contains("Query parse error"));
    }

    #[test]
    fn parses_canonical_hex() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex()).unwrap(), id);
        assert_eq!(parse_object_id(&format!(" {} ", id.to_hex())).unwrap(), id);
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in [
            "",
            "not-an-id",
            "123",
            "zzzzzzzzzzzzzzzzzzzzzzzz",
            "64b7f0c2e1a2b3c4d5e6f7a8ff",
        ] {
            assert!(
                matches!(parse_object_id(raw), Err(AppError::BadRequest(_))),
                "{raw:?} should be rejected"
            );
        }
    }
}
