use crate::application::pagination::PageQuery;
use crate::application::post_service::PostService;
use crate::application::profile_service::ProfileService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{FormPageContext, ProfileContext};
use crate::presentation::forms::{FormContext, ProfileForm};
use crate::presentation::utils::{
    AuthenticatedUser, Viewer, profile_path, redirect, request_id,
};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;

fn render_form(form: FormContext<ProfileForm>) -> HttpResponse {
    HttpResponse::Ok().json(FormPageContext { form })
}

#[get("/profile/{username}/")]
async fn user_profile(
    viewer: Viewer,
    service: web::Data<PostService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let (profile, page_obj) = service
        .profile_posts(&path.into_inner(), viewer.id(), query.requested())
        .await?;
    Ok(HttpResponse::Ok().json(ProfileContext { profile, page_obj }))
}

#[get("/edit_profile/")]
async fn edit_profile_form(
    user: AuthenticatedUser,
    service: web::Data<ProfileService>,
) -> Result<HttpResponse, DomainError> {
    let profile = service.get(user.id).await?;
    Ok(render_form(FormContext::unbound(ProfileForm::from(&profile))))
}

#[post("/edit_profile/")]
async fn edit_profile(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<ProfileService>,
    payload: web::Json<ProfileForm>,
) -> Result<HttpResponse, DomainError> {
    let form = payload.into_inner();
    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => return Ok(render_form(FormContext::invalid(form, errors))),
    };

    match service.update(user.id, draft).await {
        Ok(profile) => {
            info!(
                request_id = %request_id(&req),
                user_id = %profile.id,
                username = %profile.username,
                "profile updated"
            );
            Ok(redirect(profile_path(&profile.username)))
        }
        Err(DomainError::Validation(errors)) => Ok(render_form(FormContext::invalid(form, errors))),
        Err(err) => Err(err),
    }
}
