use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::{
    ApiResponse, ErrorCode,
    classes::requests::{ClassListQuery, ClassQueryParams},
};
use crate::services::storage_error_response;

impl From<ClassQueryParams> for ClassListQuery {
    fn from(params: ClassQueryParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

pub async fn list_classes(
    service: &ClassService,
    request: &HttpRequest,
    params: ClassQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_classes_with_pagination(ClassListQuery::from(params))
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Classes retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::web::Query;

    #[test]
    fn test_blank_search_is_dropped() {
        let params = Query::<ClassQueryParams>::from_query("page=2&search=%20%20")
            .unwrap()
            .into_inner();
        let query = ClassListQuery::from(params);
        assert_eq!(query.page, Some(2));
        assert_eq!(query.search, None);

        let params = Query::<ClassQueryParams>::from_query("search=%20Grade%205%20")
            .unwrap()
            .into_inner();
        assert_eq!(ClassListQuery::from(params).search.as_deref(), Some("Grade 5"));
    }
}
