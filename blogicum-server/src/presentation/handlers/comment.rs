use crate::application::access::Access;
use crate::application::comment_service::CommentService;
use crate::domain::error::DomainError;
use crate::presentation::dto::CommentContext;
use crate::presentation::forms::{CommentForm, FormContext};
use crate::presentation::utils::{AuthenticatedUser, post_detail_path, redirect, request_id};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::{debug, info};
use uuid::Uuid;

/// Always lands back on the post; an empty comment is dropped silently.
#[post("/posts/{post_id}/comment/")]
async fn add_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<CommentService>,
    path: web::Path<Uuid>,
    payload: web::Json<CommentForm>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    match payload.clean() {
        Ok(draft) => {
            let comment = service.add_comment(user.id, post_id, draft).await?;
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                post_id = %post_id,
                comment_id = %comment.id,
                "comment added"
            );
        }
        Err(errors) => {
            debug!(post_id = %post_id, fields = %errors, "comment rejected");
        }
    }
    Ok(redirect(post_detail_path(post_id)))
}

#[get("/posts/{post_id}/edit_comment/{comment_id}/")]
async fn edit_comment_form(
    user: AuthenticatedUser,
    service: web::Data<CommentService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    match service
        .comment_for_author(user.id, post_id, comment_id)
        .await?
    {
        Access::Permitted(comment) => Ok(HttpResponse::Ok().json(CommentContext {
            form: Some(FormContext::unbound(CommentForm::from(&comment.comment))),
            comment,
        })),
        Access::Denied => Ok(redirect(post_detail_path(post_id))),
    }
}

#[post("/posts/{post_id}/edit_comment/{comment_id}/")]
async fn edit_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<CommentService>,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<CommentForm>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    let comment = match service
        .comment_for_author(user.id, post_id, comment_id)
        .await?
    {
        Access::Permitted(comment) => comment,
        Access::Denied => return Ok(redirect(post_detail_path(post_id))),
    };

    let form = payload.into_inner();
    match form.clean() {
        Ok(draft) => {
            service.update_comment(comment_id, draft).await?;
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                comment_id = %comment_id,
                "comment updated"
            );
            Ok(redirect(post_detail_path(post_id)))
        }
        Err(errors) => Ok(HttpResponse::Ok().json(CommentContext {
            form: Some(FormContext::invalid(form, errors)),
            comment,
        })),
    }
}

#[get("/posts/{post_id}/delete_comment/{comment_id}/")]
async fn delete_comment_form(
    user: AuthenticatedUser,
    service: web::Data<CommentService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    match service
        .comment_for_author(user.id, post_id, comment_id)
        .await?
    {
        Access::Permitted(comment) => Ok(HttpResponse::Ok().json(CommentContext {
            form: None,
            comment,
        })),
        Access::Denied => Ok(redirect(post_detail_path(post_id))),
    }
}

#[post("/posts/{post_id}/delete_comment/{comment_id}/")]
async fn delete_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<CommentService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    if let Access::Denied = service
        .comment_for_author(user.id, post_id, comment_id)
        .await?
    {
        return Ok(redirect(post_detail_path(post_id)));
    }

    service.delete_comment(comment_id).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        comment_id = %comment_id,
        "comment deleted"
    );

    Ok(redirect(post_detail_path(post_id)))
}
