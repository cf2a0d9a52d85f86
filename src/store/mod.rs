//! Cached, typed access to studio content.
//!
//! `ContentStore` is the hook layer of the site: constructed once at
//! application start and injected into consumers (no module-level
//! singletons). Every content type gets its own stale-while-revalidate
//! cache cell; page content gets one cell per page id. The configured
//! empty policy decides whether empty/failed outcomes are replaced by the
//! static fallback records or surfaced for the page to render its own
//! empty-state.
//!
//! Keys are independent: a hung fetch for one content type never blocks
//! another, and no cross-type consistency is promised — settings and
//! skills may reflect different moments if both change remotely between
//! fetches.

mod cache;
mod state;

pub use self::state::ContentState;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::client::{ContentBackend, ContentClient};
use crate::config::{ContentConfig, EmptyPolicy};
use crate::fallback;
use crate::types::{
    Activity, Certification, Education, Experience, HeroContent, NavigationItem, PageContent,
    Project, QuickLink, SiteSettings, Skill,
};

use self::cache::CacheCell;
use self::state::{collection_state, singleton_state};

/// Cache key for invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentKey {
    Hero,
    Skills,
    Activities,
    Certifications,
    Experiences,
    Education,
    Projects,
    FeaturedProjects,
    SiteSettings,
    Navigation,
    QuickLinks,
    Page(String),
}

pub struct ContentStore {
    backend: Arc<dyn ContentBackend>,
    policy: EmptyPolicy,
    stale_after: Duration,
    hero: CacheCell<HeroContent>,
    skills: CacheCell<Vec<Skill>>,
    activities: CacheCell<Vec<Activity>>,
    certifications: CacheCell<Vec<Certification>>,
    experiences: CacheCell<Vec<Experience>>,
    education: CacheCell<Vec<Education>>,
    projects: CacheCell<Vec<Project>>,
    featured_projects: CacheCell<Vec<Project>>,
    site_settings: CacheCell<SiteSettings>,
    navigation: CacheCell<Vec<NavigationItem>>,
    quick_links: CacheCell<Vec<QuickLink>>,
    pages: DashMap<String, CacheCell<PageContent>>,
}

impl ContentStore {
    /// Build a store over an injected backend.
    pub fn new(config: &ContentConfig, backend: Arc<dyn ContentBackend>) -> Self {
        let stale_after = config.stale_after();
        Self {
            backend,
            policy: config.on_empty,
            stale_after,
            hero: CacheCell::new("hero", stale_after),
            skills: CacheCell::new("skills", stale_after),
            activities: CacheCell::new("activities", stale_after),
            certifications: CacheCell::new("certifications", stale_after),
            experiences: CacheCell::new("experiences", stale_after),
            education: CacheCell::new("education", stale_after),
            projects: CacheCell::new("projects", stale_after),
            featured_projects: CacheCell::new("featuredProjects", stale_after),
            site_settings: CacheCell::new("siteSettings", stale_after),
            navigation: CacheCell::new("navigation", stale_after),
            quick_links: CacheCell::new("quickLinks", stale_after),
            pages: DashMap::new(),
        }
    }

    /// Build a store backed by the live studio client.
    pub fn from_config(config: ContentConfig) -> Self {
        let client = ContentClient::new(config.clone());
        Self::new(&config, Arc::new(client))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Drop one key's cached state. The next read refetches.
    pub fn invalidate(&self, key: &ContentKey) {
        match key {
            ContentKey::Hero => self.hero.invalidate(),
            ContentKey::Skills => self.skills.invalidate(),
            ContentKey::Activities => self.activities.invalidate(),
            ContentKey::Certifications => self.certifications.invalidate(),
            ContentKey::Experiences => self.experiences.invalidate(),
            ContentKey::Education => self.education.invalidate(),
            ContentKey::Projects => self.projects.invalidate(),
            ContentKey::FeaturedProjects => self.featured_projects.invalidate(),
            ContentKey::SiteSettings => self.site_settings.invalidate(),
            ContentKey::Navigation => self.navigation.invalidate(),
            ContentKey::QuickLinks => self.quick_links.invalidate(),
            ContentKey::Page(page_id) => {
                if let Some(cell) = self.pages.get(page_id) {
                    cell.invalidate();
                }
            }
        }
    }

    /// Drop everything. In-flight fetches complete into fresh slots.
    pub fn invalidate_all(&self) {
        self.hero.invalidate();
        self.skills.invalidate();
        self.activities.invalidate();
        self.certifications.invalidate();
        self.experiences.invalidate();
        self.education.invalidate();
        self.projects.invalidate();
        self.featured_projects.invalidate();
        self.site_settings.invalidate();
        self.navigation.invalidate();
        self.quick_links.invalidate();
        for cell in self.pages.iter() {
            cell.value().invalidate();
        }
    }

    // ------------------------------------------------------------------
    // Resolved accessors (fetch through the cache)
    // ------------------------------------------------------------------

    pub async fn hero(&self) -> ContentState<HeroContent> {
        let backend = Arc::clone(&self.backend);
        let state = self
            .hero
            .get_with(move || async move { singleton_state(backend.hero().await) })
            .await;
        self.finish(state, fallback::hero)
    }

    pub async fn skills(&self) -> ContentState<Vec<Skill>> {
        let backend = Arc::clone(&self.backend);
        let state = self
            .skills
            .get_with(move || async move { collection_state(backend.skills().await) })
            .await;
        self.finish(state, fallback::skills)
    }

    pub async fn activities(&self) -> ContentState<Vec<Activity>> {
        let backend = Arc::clone(&self.backend);
        let state = self
            .activities
            .get_with(move || async move { collection_state(backend.activities().await) })
            .await;
        self.finish(state, fallback::activities)
    }

    pub async fn certifications(&self) -> ContentState<Vec<Certification>> {
        let backend = Arc::clone(&self.backend);
        let state = self
            .certifications
            .get_with(move || async move { collection_state(backend.certifications().await) })
            .await;
        self.finish(state, fallback::certifications)
    }

    pub async fn experiences(&self) -> ContentState<Vec<Experience>> {
        let backend = Arc::clone(&self.backend);
        let state = self
            .experiences
            .get_with(move || async move { collection_state(backend.experiences().await) })
            .await;
        self.finish(state, fallback::experiences)
    }

    pub async fn education(&self) -> ContentState<Vec<Education>> {
        let backend = Arc::clone(&self.backend);
        let state = self
            .education
            .get_with(move || async move { collection_state(backend.education().await) })
            .await;
        self.finish(state, fallback::education)
    }

    pub async fn projects(&self) -> ContentState<Vec<Project>> {
        let backend = Arc::clone(&self.backend);
        let state = self
            .projects
            .get_with(move || async move { collection_state(backend.projects().await) })
            .await;
        self.finish(state, fallback::projects)
    }

    pub async fn featured_projects(&self) -> ContentState<Vec<Project>> {
        let backend = Arc::clone(&self.backend);
        let state = self
            .featured_projects
            .get_with(move || async move { collection_state(backend.featured_projects().await) })
            .await;
        self.finish(state, fallback::featured_projects)
    }

    pub async fn site_settings(&self) -> ContentState<SiteSettings> {
        let backend = Arc::clone(&self.backend);
        let state = self
            .site_settings
            .get_with(move || async move { singleton_state(backend.site_settings().await) })
            .await;
        self.finish(state, fallback::site_settings)
    }

    pub async fn navigation(&self) -> ContentState<Vec<NavigationItem>> {
        let backend = Arc::clone(&self.backend);
        let state = self
            .navigation
            .get_with(move || async move { collection_state(backend.navigation().await) })
            .await;
        self.finish(state, fallback::navigation)
    }

    pub async fn quick_links(&self) -> ContentState<Vec<QuickLink>> {
        let backend = Arc::clone(&self.backend);
        let state = self
            .quick_links
            .get_with(move || async move { collection_state(backend.quick_links().await) })
            .await;
        self.finish(state, fallback::quick_links)
    }

    pub async fn page_content(&self, page_id: &str) -> ContentState<PageContent> {
        let cell = self.page_cell(page_id);
        let backend = Arc::clone(&self.backend);
        let id = page_id.to_string();
        let state = cell
            .get_with(move || async move { singleton_state(backend.page_content(&id).await) })
            .await;
        self.finish_page(page_id, state)
    }

    // ------------------------------------------------------------------
    // Peek accessors (observe without fetching)
    // ------------------------------------------------------------------

    pub fn peek_hero(&self) -> ContentState<HeroContent> {
        self.finish(self.hero.peek(), fallback::hero)
    }

    pub fn peek_skills(&self) -> ContentState<Vec<Skill>> {
        self.finish(self.skills.peek(), fallback::skills)
    }

    pub fn peek_activities(&self) -> ContentState<Vec<Activity>> {
        self.finish(self.activities.peek(), fallback::activities)
    }

    pub fn peek_certifications(&self) -> ContentState<Vec<Certification>> {
        self.finish(self.certifications.peek(), fallback::certifications)
    }

    pub fn peek_experiences(&self) -> ContentState<Vec<Experience>> {
        self.finish(self.experiences.peek(), fallback::experiences)
    }

    pub fn peek_education(&self) -> ContentState<Vec<Education>> {
        self.finish(self.education.peek(), fallback::education)
    }

    pub fn peek_projects(&self) -> ContentState<Vec<Project>> {
        self.finish(self.projects.peek(), fallback::projects)
    }

    pub fn peek_featured_projects(&self) -> ContentState<Vec<Project>> {
        self.finish(self.featured_projects.peek(), fallback::featured_projects)
    }

    pub fn peek_site_settings(&self) -> ContentState<SiteSettings> {
        self.finish(self.site_settings.peek(), fallback::site_settings)
    }

    pub fn peek_navigation(&self) -> ContentState<Vec<NavigationItem>> {
        self.finish(self.navigation.peek(), fallback::navigation)
    }

    pub fn peek_quick_links(&self) -> ContentState<Vec<QuickLink>> {
        self.finish(self.quick_links.peek(), fallback::quick_links)
    }

    pub fn peek_page_content(&self, page_id: &str) -> ContentState<PageContent> {
        let state = match self.pages.get(page_id) {
            Some(cell) => cell.peek(),
            None => ContentState::Loading,
        };
        self.finish_page(page_id, state)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn page_cell(&self, page_id: &str) -> CacheCell<PageContent> {
        if let Some(cell) = self.pages.get(page_id) {
            return cell.clone();
        }
        self.pages
            .entry(page_id.to_string())
            .or_insert_with(|| {
                CacheCell::new(format!("pageContent:{page_id}"), self.stale_after)
            })
            .clone()
    }

    /// Apply the configured empty policy to a terminal state.
    fn finish<T>(&self, state: ContentState<T>, fallback: impl FnOnce() -> T) -> ContentState<T> {
        match self.policy {
            EmptyPolicy::Fallback => match state {
                // The fallback generation of the site could not tell a
                // failed fetch from an empty dataset; both get substituted.
                ContentState::Empty | ContentState::Failed(_) => ContentState::Loaded(fallback()),
                other => other,
            },
            EmptyPolicy::EmptyState => state,
        }
    }

    fn finish_page(&self, page_id: &str, state: ContentState<PageContent>) -> ContentState<PageContent> {
        match self.policy {
            EmptyPolicy::Fallback => match state {
                ContentState::Empty | ContentState::Failed(_) => {
                    match fallback::page_content(page_id) {
                        Some(page) => ContentState::Loaded(page),
                        // No canned copy for this page id; keep the outcome.
                        None => state,
                    }
                }
                other => other,
            },
            EmptyPolicy::EmptyState => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::ContentError;

    /// Scripted backend: returns whatever the test configured and counts
    /// every call across all content types.
    #[derive(Default)]
    struct FakeBackend {
        hero: Option<HeroContent>,
        skills: Vec<Skill>,
        page: Option<PageContent>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn outcome<T>(&self, value: T) -> Result<T, ContentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ContentError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                })
            } else {
                Ok(value)
            }
        }
    }

    #[async_trait]
    impl ContentBackend for FakeBackend {
        async fn hero(&self) -> Result<Option<HeroContent>, ContentError> {
            self.outcome(self.hero.clone())
        }
        async fn skills(&self) -> Result<Vec<Skill>, ContentError> {
            self.outcome(self.skills.clone())
        }
        async fn activities(&self) -> Result<Vec<Activity>, ContentError> {
            self.outcome(Vec::new())
        }
        async fn certifications(&self) -> Result<Vec<Certification>, ContentError> {
            self.outcome(Vec::new())
        }
        async fn experiences(&self) -> Result<Vec<Experience>, ContentError> {
            self.outcome(Vec::new())
        }
        async fn education(&self) -> Result<Vec<Education>, ContentError> {
            self.outcome(Vec::new())
        }
        async fn projects(&self) -> Result<Vec<Project>, ContentError> {
            self.outcome(Vec::new())
        }
        async fn featured_projects(&self) -> Result<Vec<Project>, ContentError> {
            self.outcome(Vec::new())
        }
        async fn site_settings(&self) -> Result<Option<SiteSettings>, ContentError> {
            self.outcome(None)
        }
        async fn navigation(&self) -> Result<Vec<NavigationItem>, ContentError> {
            self.outcome(Vec::new())
        }
        async fn quick_links(&self) -> Result<Vec<QuickLink>, ContentError> {
            self.outcome(Vec::new())
        }
        async fn page_content(&self, page_id: &str) -> Result<Option<PageContent>, ContentError> {
            let page = self.page.clone().filter(|p| p.page_id == page_id);
            self.outcome(page)
        }
    }

    fn store_with(policy: EmptyPolicy, backend: FakeBackend) -> (ContentStore, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        let mut config = ContentConfig::new("p123");
        config.on_empty = policy;
        let store = ContentStore::new(&config, Arc::clone(&backend) as Arc<dyn ContentBackend>);
        (store, backend)
    }

    fn skill(id: &str, name: &str, order: i64) -> Skill {
        Skill {
            id: id.to_string(),
            name: name.to_string(),
            category: "3D Modeling".to_string(),
            proficiency: 90,
            icon: None,
            description: None,
            order,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_skills_resolve_once_and_cache() {
        let (store, backend) = store_with(
            EmptyPolicy::EmptyState,
            FakeBackend {
                skills: vec![skill("s2", "AutoCAD", 1), skill("s1", "SolidWorks", 2)],
                ..Default::default()
            },
        );

        let first = store.skills().await;
        let second = store.skills().await;
        assert_eq!(first, second);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        let names: Vec<&str> = first
            .data()
            .unwrap()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["AutoCAD", "SolidWorks"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_store_requests_coalesce() {
        let (store, backend) = store_with(
            EmptyPolicy::EmptyState,
            FakeBackend {
                skills: vec![skill("s1", "SolidWorks", 1)],
                ..Default::default()
            },
        );

        let (a, b, c) = tokio::join!(store.skills(), store.skills(), store.skills());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_state_policy_surfaces_empty_and_failed() {
        let (store, _) = store_with(EmptyPolicy::EmptyState, FakeBackend::default());
        assert!(store.skills().await.is_empty());
        assert!(store.hero().await.is_empty());

        let (store, _) = store_with(
            EmptyPolicy::EmptyState,
            FakeBackend {
                fail: true,
                ..Default::default()
            },
        );
        let state = store.skills().await;
        assert!(state.is_failed());
        // Failed carries a reason; Empty does not — consumers can tell.
        assert_ne!(state, ContentState::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_policy_substitutes_empty_and_failed() {
        let (store, _) = store_with(EmptyPolicy::Fallback, FakeBackend::default());
        let skills = store.skills().await;
        let names: Vec<&str> = skills
            .data()
            .expect("fallback skills substituted")
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert!(names.contains(&"AutoCAD"));

        let (store, _) = store_with(
            EmptyPolicy::Fallback,
            FakeBackend {
                fail: true,
                ..Default::default()
            },
        );
        assert!(store.hero().await.is_loaded());
        assert!(store.navigation().await.is_loaded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loaded_content_never_substituted() {
        let (store, _) = store_with(
            EmptyPolicy::Fallback,
            FakeBackend {
                skills: vec![skill("s1", "CATIA", 1)],
                ..Default::default()
            },
        );
        let skills = store.skills().await;
        assert_eq!(skills.data().unwrap()[0].name, "CATIA");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_page_content_empty_state() {
        let (store, _) = store_with(EmptyPolicy::EmptyState, FakeBackend::default());
        assert!(store.page_content("contact").await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_page_content_fallback_copy() {
        let (store, _) = store_with(EmptyPolicy::Fallback, FakeBackend::default());
        let page = store.page_content("contact").await;
        let page = page.data().expect("contact fallback substituted");
        assert_eq!(page.title, "Contact");
        assert_eq!(page.description.as_deref(), Some("Get in touch"));

        // Unknown page id has no canned copy; the outcome passes through.
        assert!(store.page_content("blog").await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_cells_are_independent() {
        let page = PageContent {
            id: "doc-1".to_string(),
            page_id: "contact".to_string(),
            title: "Reach out".to_string(),
            subtitle: None,
            description: None,
            seo: None,
        };
        let (store, backend) = store_with(
            EmptyPolicy::EmptyState,
            FakeBackend {
                page: Some(page),
                ..Default::default()
            },
        );

        assert!(store.page_content("contact").await.is_loaded());
        assert!(store.page_content("skills").await.is_empty());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);

        // Cached per page id.
        assert!(store.page_content("contact").await.is_loaded());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_refetches_one_key() {
        let (store, backend) = store_with(
            EmptyPolicy::EmptyState,
            FakeBackend {
                skills: vec![skill("s1", "SolidWorks", 1)],
                ..Default::default()
            },
        );

        store.skills().await;
        store.invalidate(&ContentKey::Skills);
        store.skills().await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_staleness_window_through_store() {
        let (store, backend) = store_with(
            EmptyPolicy::EmptyState,
            FakeBackend {
                skills: vec![skill("s1", "SolidWorks", 1)],
                ..Default::default()
            },
        );

        store.skills().await;
        tokio::time::advance(Duration::from_secs(299)).await;
        store.skills().await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        store.skills().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_peek_before_any_fetch_is_loading() {
        let (store, _) = store_with(EmptyPolicy::EmptyState, FakeBackend::default());
        assert!(store.peek_skills().is_loading());
        assert!(store.peek_page_content("contact").is_loading());
    }
}
