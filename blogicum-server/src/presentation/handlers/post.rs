use crate::application::access::Access;
use crate::application::pagination::PageQuery;
use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{
    CategoryContext, FormPageContext, IndexContext, PostDeleteContext, PostDetailContext,
};
use crate::presentation::forms::{CommentForm, FormContext, PostForm};
use crate::presentation::utils::{
    AuthenticatedUser, Viewer, post_detail_path, profile_path, redirect, request_id,
};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;
use uuid::Uuid;

fn render_form(form: FormContext<PostForm>) -> HttpResponse {
    HttpResponse::Ok().json(FormPageContext { form })
}

#[get("/")]
async fn index(
    service: web::Data<PostService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let page_obj = service.index(query.requested()).await?;
    Ok(HttpResponse::Ok().json(IndexContext { page_obj }))
}

#[get("/category/{slug}/")]
async fn category_posts(
    service: web::Data<PostService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let (category, page_obj) = service
        .category_posts(&path.into_inner(), query.requested())
        .await?;
    Ok(HttpResponse::Ok().json(CategoryContext { category, page_obj }))
}

#[get("/posts/{post_id}/")]
async fn post_detail(
    viewer: Viewer,
    service: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let (post, comments) = service.post_detail(path.into_inner(), viewer.id()).await?;
    Ok(HttpResponse::Ok().json(PostDetailContext {
        post,
        comments,
        form: FormContext::unbound(CommentForm::default()),
    }))
}

#[get("/posts/create/")]
async fn create_post_form(_user: AuthenticatedUser) -> HttpResponse {
    render_form(FormContext::unbound(PostForm::default()))
}

#[post("/posts/create/")]
async fn create_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<PostService>,
    payload: web::Json<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let form = payload.into_inner();
    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => return Ok(render_form(FormContext::invalid(form, errors))),
    };

    match service.create_post(user.id, draft).await {
        Ok(post) => {
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                post_id = %post.id,
                "post created"
            );
            Ok(redirect(profile_path(&user.username)))
        }
        Err(DomainError::Validation(errors)) => Ok(render_form(FormContext::invalid(form, errors))),
        Err(err) => Err(err),
    }
}

#[get("/posts/{post_id}/edit/")]
async fn edit_post_form(
    user: AuthenticatedUser,
    service: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    match service.post_for_author(user.id, post_id).await? {
        Access::Permitted(post) => Ok(render_form(FormContext::unbound(PostForm::from(&post)))),
        Access::Denied => Ok(redirect(post_detail_path(post_id))),
    }
}

#[post("/posts/{post_id}/edit/")]
async fn edit_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<PostService>,
    path: web::Path<Uuid>,
    payload: web::Json<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let post = match service.post_for_author(user.id, post_id).await? {
        Access::Permitted(post) => post,
        Access::Denied => return Ok(redirect(post_detail_path(post_id))),
    };

    let form = payload.into_inner();
    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => return Ok(render_form(FormContext::invalid(form, errors))),
    };

    match service.update_post(post, draft).await {
        Ok(_) => {
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                post_id = %post_id,
                "post updated"
            );
            Ok(redirect(post_detail_path(post_id)))
        }
        Err(DomainError::Validation(errors)) => Ok(render_form(FormContext::invalid(form, errors))),
        Err(err) => Err(err),
    }
}

#[get("/posts/{post_id}/delete/")]
async fn delete_post_form(
    user: AuthenticatedUser,
    service: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    match service.post_for_author(user.id, post_id).await? {
        Access::Permitted(post) => Ok(HttpResponse::Ok().json(PostDeleteContext { post })),
        Access::Denied => Ok(redirect(post_detail_path(post_id))),
    }
}

#[post("/posts/{post_id}/delete/")]
async fn delete_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    if let Access::Denied = service.post_for_author(user.id, post_id).await? {
        return Ok(redirect(post_detail_path(post_id)));
    }

    service.delete_post(post_id).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post_id,
        "post deleted"
    );

    Ok(redirect(profile_path(&user.username)))
}
