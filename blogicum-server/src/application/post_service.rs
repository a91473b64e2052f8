use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::application::access::{Access, author_only, can_view_post};
use crate::application::pagination::{PAGE_SIZE, Page, Paginator};
use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::location_repository::LocationRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::category::Category;
use crate::domain::comment::CommentDetails;
use crate::domain::error::{DomainError, FieldErrors, INVALID_CHOICE};
use crate::domain::post::{Post, PostDetails, PostDraft};
use crate::domain::user::User;
use crate::domain::visibility::PostFilter;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    categories: Arc<dyn CategoryRepository>,
    locations: Arc<dyn LocationRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        categories: Arc<dyn CategoryRepository>,
        locations: Arc<dyn LocationRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            posts,
            comments,
            categories,
            locations,
            users,
        }
    }

    /// Filter, annotate and slice: count what the filter admits, settle the
    /// page number, then fetch only that window.
    async fn paginate(
        &self,
        filter: PostFilter,
        requested: Option<&str>,
    ) -> Result<Page<PostDetails>, DomainError> {
        let total = self.posts.count(&filter).await?;
        let paginator = Paginator::new(total, PAGE_SIZE);
        let number = paginator.resolve(requested);
        let items = self
            .posts
            .list(&filter, paginator.limit(), paginator.offset(number))
            .await?;
        Ok(paginator.page(items, number))
    }

    pub async fn index(&self, requested: Option<&str>) -> Result<Page<PostDetails>, DomainError> {
        self.paginate(PostFilter::published(Utc::now()), requested)
            .await
    }

    pub async fn category_posts(
        &self,
        slug: &str,
        requested: Option<&str>,
    ) -> Result<(Category, Page<PostDetails>), DomainError> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| DomainError::CategoryNotFound(slug.to_string()))?;

        let filter = PostFilter::published(Utc::now()).in_category(category.id);
        let page = self.paginate(filter, requested).await?;
        Ok((category, page))
    }

    /// The owner sees every post they wrote; everyone else only the public ones.
    pub async fn profile_posts(
        &self,
        username: &str,
        viewer: Option<Uuid>,
        requested: Option<&str>,
    ) -> Result<(User, Page<PostDetails>), DomainError> {
        let profile = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))?;

        let filter = if viewer == Some(profile.id) {
            PostFilter::all()
        } else {
            PostFilter::published(Utc::now())
        }
        .by_author(profile.id);

        let page = self.paginate(filter, requested).await?;
        Ok((profile, page))
    }

    /// Hidden posts look missing to anyone but their author.
    pub async fn post_detail(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<(PostDetails, Vec<CommentDetails>), DomainError> {
        let post = self
            .posts
            .find_details(post_id, &PostFilter::all())
            .await?
            .filter(|p| can_view_post(viewer, p, Utc::now()))
            .ok_or(DomainError::PostNotFound(post_id))?;

        let comments = self.comments.list_for_post(post_id).await?;
        Ok((post, comments))
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }

    /// Loads a post for editing or deletion on behalf of `requester`.
    pub async fn post_for_author(
        &self,
        requester: Uuid,
        post_id: Uuid,
    ) -> Result<Access<Post>, DomainError> {
        let post = self.get_post(post_id).await?;
        Ok(author_only(requester, post.author_id, post))
    }

    async fn check_references(&self, draft: &PostDraft) -> Result<(), DomainError> {
        let mut errors = FieldErrors::new();
        if self.categories.find_by_id(draft.category_id).await?.is_none() {
            errors.add("category", INVALID_CHOICE);
        }
        if let Some(location_id) = draft.location_id {
            if self.locations.find_by_id(location_id).await?.is_none() {
                errors.add("location", INVALID_CHOICE);
            }
        }
        errors.into_result().map_err(DomainError::Validation)
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_post(&self, author_id: Uuid, draft: PostDraft) -> Result<Post, DomainError> {
        self.check_references(&draft).await?;
        self.posts.create(Post::new(author_id, draft)).await
    }

    #[instrument(skip(self, post, draft), fields(post_id = %post.id))]
    pub async fn update_post(&self, mut post: Post, draft: PostDraft) -> Result<Post, DomainError> {
        self.check_references(&draft).await?;
        post.apply(draft);
        self.posts.update(post).await
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, post_id: Uuid) -> Result<(), DomainError> {
        self.posts.delete(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;
    use crate::domain::category::Category;
    use crate::domain::comment::Comment;
    use crate::domain::location::Location;
    use chrono::{DateTime, Duration};

    struct Fixture {
        store: MemoryStore,
        service: PostService,
        author: User,
        reader: User,
        news: Category,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let service = PostService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );
        let author = store.insert_user(User::new("author".into(), String::new(), "x".into()));
        let reader = store.insert_user(User::new("reader".into(), String::new(), "x".into()));
        let news = store.insert_category(Category::new(
            "News".into(),
            "Latest".into(),
            "news".into(),
        ));
        Fixture {
            store,
            service,
            author,
            reader,
            news,
        }
    }

    fn draft(category_id: Uuid, pub_date: DateTime<Utc>) -> PostDraft {
        PostDraft {
            title: "A post".into(),
            text: "Body".into(),
            pub_date,
            category_id,
            location_id: None,
            image: None,
            is_published: true,
        }
    }

    fn seed(f: &Fixture, category_id: Uuid, offset: Duration, is_published: bool) -> Post {
        let mut post = Post::new(f.author.id, draft(category_id, Utc::now() + offset));
        post.is_published = is_published;
        f.store.insert_post(post)
    }

    fn ids(page: &Page<PostDetails>) -> Vec<Uuid> {
        page.object_list.iter().map(|d| d.post.id).collect()
    }

    #[tokio::test]
    async fn index_lists_only_public_posts_newest_first() {
        let f = fixture();
        let older = seed(&f, f.news.id, -Duration::days(2), true);
        let newer = seed(&f, f.news.id, -Duration::days(1), true);
        seed(&f, f.news.id, -Duration::days(1), false);
        seed(&f, f.news.id, Duration::days(1), true);

        let page = f.service.index(None).await.unwrap();
        assert_eq!(ids(&page), vec![newer.id, older.id]);
        assert_eq!(page.count, 2);
    }

    #[tokio::test]
    async fn unpublished_category_hides_post_from_index_but_not_from_author() {
        let f = fixture();
        let mut hidden = Category::new("Hidden".into(), String::new(), "hidden".into());
        hidden.is_published = false;
        let hidden = f.store.insert_category(hidden);
        let post = seed(&f, hidden.id, -Duration::days(1), true);

        assert!(f.service.index(None).await.unwrap().is_empty());

        let (_, own) = f
            .service
            .profile_posts("author", Some(f.author.id), None)
            .await
            .unwrap();
        assert_eq!(ids(&own), vec![post.id]);

        let (_, foreign) = f
            .service
            .profile_posts("author", Some(f.reader.id), None)
            .await
            .unwrap();
        assert!(foreign.is_empty());

        assert!(f.service.post_detail(post.id, Some(f.author.id)).await.is_ok());
        assert!(matches!(
            f.service.post_detail(post.id, None).await,
            Err(DomainError::PostNotFound(_))
        ));
    }

    #[tokio::test]
    async fn unpublished_category_page_is_not_found() {
        let f = fixture();
        let mut hidden = Category::new("Hidden".into(), String::new(), "hidden".into());
        hidden.is_published = false;
        f.store.insert_category(hidden);

        assert!(matches!(
            f.service.category_posts("hidden", None).await,
            Err(DomainError::CategoryNotFound(_))
        ));
        assert!(matches!(
            f.service.category_posts("missing", None).await,
            Err(DomainError::CategoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn category_page_lists_its_own_public_posts() {
        let f = fixture();
        let travel = f
            .store
            .insert_category(Category::new("Travel".into(), String::new(), "travel".into()));
        let in_news = seed(&f, f.news.id, -Duration::hours(3), true);
        seed(&f, travel.id, -Duration::hours(3), true);

        let (category, page) = f.service.category_posts("news", None).await.unwrap();
        assert_eq!(category.id, f.news.id);
        assert_eq!(ids(&page), vec![in_news.id]);
    }

    #[tokio::test]
    async fn listing_paginates_by_ten() {
        let f = fixture();
        for i in 0..25 {
            seed(&f, f.news.id, -Duration::minutes(i + 1), true);
        }

        let first = f.service.index(Some("1")).await.unwrap();
        let third = f.service.index(Some("3")).await.unwrap();
        let clamped = f.service.index(Some("99")).await.unwrap();

        assert_eq!((first.len(), third.len()), (10, 5));
        assert_eq!(first.num_pages, 3);
        assert_eq!(clamped.number, 3);
        assert_eq!(ids(&clamped), ids(&third));
    }

    #[tokio::test]
    async fn listing_carries_comment_counts_and_joined_rows() {
        let f = fixture();
        let location = f.store.insert_location(Location::new("Moscow".into()));
        let mut post = Post::new(f.author.id, draft(f.news.id, Utc::now() - Duration::hours(1)));
        post.location_id = Some(location.id);
        let post = f.store.insert_post(post);
        for text in ["first", "second"] {
            f.store
                .insert_comment(Comment::new(post.id, f.reader.id, text.into()));
        }

        let page = f.service.index(None).await.unwrap();
        let row = &page.object_list[0];
        assert_eq!(row.comment_count, 2);
        assert_eq!(row.author.username, "author");
        assert_eq!(row.category.as_ref().map(|c| c.slug.as_str()), Some("news"));
        assert_eq!(row.location.as_ref().map(|l| l.name.as_str()), Some("Moscow"));
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.service.profile_posts("nobody", None, None).await,
            Err(DomainError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn create_rejects_unknown_category_and_location() {
        let f = fixture();
        let mut bad = draft(Uuid::new_v4(), Utc::now());
        bad.location_id = Some(Uuid::new_v4());

        match f.service.create_post(f.author.id, bad).await {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.get("category").is_some());
                assert!(errors.get("location").is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn only_the_author_may_edit() {
        let f = fixture();
        let post = seed(&f, f.news.id, -Duration::days(1), true);

        assert!(
            f.service
                .post_for_author(f.author.id, post.id)
                .await
                .unwrap()
                .is_permitted()
        );
        assert!(matches!(
            f.service
                .post_for_author(f.reader.id, post.id)
                .await
                .unwrap(),
            Access::Denied
        ));
    }

    #[tokio::test]
    async fn update_keeps_author_and_applies_fields() {
        let f = fixture();
        let post = seed(&f, f.news.id, -Duration::days(1), true);
        let mut changes = draft(f.news.id, Utc::now());
        changes.title = "Renamed".into();
        changes.is_published = false;

        let updated = f.service.update_post(post.clone(), changes).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert!(!updated.is_published);
        assert_eq!(updated.author_id, f.author.id);
        assert_eq!(f.store.post(post.id).map(|p| p.title), Some("Renamed".into()));
    }

    #[tokio::test]
    async fn delete_removes_post_and_its_comments() {
        let f = fixture();
        let post = seed(&f, f.news.id, -Duration::days(1), true);
        f.store
            .insert_comment(Comment::new(post.id, f.reader.id, "hi".into()));

        f.service.delete_post(post.id).await.unwrap();
        assert!(f.store.post(post.id).is_none());
        assert!(f.store.comments_of(post.id).is_empty());
    }
}
