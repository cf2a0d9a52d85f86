//! Query client for the hosted content studio.
//!
//! One read query per content type against the studio's query endpoint
//! (`https://<project>.apicdn.sanity.io/v<version>/data/query/<dataset>`).
//! Queries are declarative filter/sort expressions; the only parameterized
//! path is the page-content lookup (`pageId == $pageId`, first match).
//!
//! Records are normalized here at the fetch boundary: collections are
//! re-sorted by their declared order key (the query already orders them,
//! but a misbehaving backend must not leak out-of-order lists), skill
//! proficiency is clamped to 0–100, and image references that don't parse
//! are dropped to `None` so presentation code never sees a broken pointer.

pub mod retry;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::ContentConfig;
use crate::error::ContentError;
use crate::image::{self, Transform};
use crate::types::{
    parse_content_date, Activity, Certification, Education, Experience, HeroContent, ImageRef,
    NavigationItem, PageContent, Project, QuickLink, Seo, SiteSettings, Skill,
};

use self::retry::RetryPolicy;

// ============================================================================
// Queries
// ============================================================================

const QUERY_HERO: &str = r#"*[_type == "heroContent"][0]"#;
const QUERY_SKILLS: &str = r#"*[_type == "skill"] | order(order asc)"#;
const QUERY_ACTIVITIES: &str = r#"*[_type == "activity"] | order(date desc)"#;
const QUERY_CERTIFICATIONS: &str = r#"*[_type == "certification"] | order(order asc)"#;
const QUERY_EXPERIENCES: &str = r#"*[_type == "experience"] | order(order asc)"#;
const QUERY_EDUCATION: &str = r#"*[_type == "education"] | order(order asc)"#;
const QUERY_PROJECTS: &str = r#"*[_type == "project"] | order(order asc)"#;
const QUERY_FEATURED_PROJECTS: &str =
    r#"*[_type == "project" && featured == true] | order(order asc)"#;
const QUERY_SITE_SETTINGS: &str = r#"*[_type == "siteSettings"][0]"#;
const QUERY_PAGE_CONTENT: &str = r#"*[_type == "pageContent" && pageId == $pageId][0]"#;
const QUERY_NAVIGATION: &str = r#"*[_type == "navigationItem"] | order(order asc)"#;
const QUERY_QUICK_LINKS: &str = r#"*[_type == "quickLink"] | order(order asc)"#;

/// Response envelope from the query endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct QueryEnvelope<T> {
    #[serde(default)]
    result: Option<T>,
}

// ============================================================================
// Backend trait
// ============================================================================

/// Read access to every content type.
///
/// `ContentClient` is the production implementation; the store depends on
/// this trait so tests can substitute a scripted backend.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    async fn hero(&self) -> Result<Option<HeroContent>, ContentError>;
    async fn skills(&self) -> Result<Vec<Skill>, ContentError>;
    async fn activities(&self) -> Result<Vec<Activity>, ContentError>;
    async fn certifications(&self) -> Result<Vec<Certification>, ContentError>;
    async fn experiences(&self) -> Result<Vec<Experience>, ContentError>;
    async fn education(&self) -> Result<Vec<Education>, ContentError>;
    async fn projects(&self) -> Result<Vec<Project>, ContentError>;
    async fn featured_projects(&self) -> Result<Vec<Project>, ContentError>;
    async fn site_settings(&self) -> Result<Option<SiteSettings>, ContentError>;
    async fn navigation(&self) -> Result<Vec<NavigationItem>, ContentError>;
    async fn quick_links(&self) -> Result<Vec<QuickLink>, ContentError>;
    async fn page_content(&self, page_id: &str) -> Result<Option<PageContent>, ContentError>;
}

// ============================================================================
// Client
// ============================================================================

/// Stateless client for the studio query endpoint.
///
/// Safe to call concurrently and repeatedly; holds nothing but the HTTP
/// connection pool and the studio coordinates.
pub struct ContentClient {
    http: reqwest::Client,
    config: ContentConfig,
    retry: RetryPolicy,
}

impl ContentClient {
    pub fn new(config: ContentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build the full query URL for a GROQ string plus `$name` parameters.
    fn query_url(
        &self,
        groq: &str,
        params: &[(&str, &serde_json::Value)],
    ) -> Result<Url, ContentError> {
        let host = if self.config.use_cdn {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        let base = format!(
            "https://{project}.{host}/v{version}/data/query/{dataset}",
            project = self.config.project_id,
            version = self.config.api_version,
            dataset = self.config.dataset,
        );
        let mut url = Url::parse(&base).map_err(|e| ContentError::Url(e.to_string()))?;
        url.query_pairs_mut().append_pair("query", groq);
        for (name, value) in params {
            // Parameters are JSON literals on the wire, e.g. $pageId="contact".
            url.query_pairs_mut()
                .append_pair(&format!("${name}"), &value.to_string());
        }
        Ok(url)
    }

    /// Run a query and unwrap the result envelope.
    ///
    /// `None` means the query matched nothing (singleton `[0]` on an empty
    /// set comes back as a null result).
    async fn run_query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, &serde_json::Value)],
    ) -> Result<Option<T>, ContentError> {
        let url = self.query_url(groq, params)?;
        let mut request = self.http.get(url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let resp = retry::send_with_retry(request, &self.retry).await?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ContentError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ContentError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: QueryEnvelope<T> = resp.json().await?;
        Ok(envelope.result)
    }

    async fn run_collection<T: DeserializeOwned>(
        &self,
        groq: &str,
    ) -> Result<Vec<T>, ContentError> {
        Ok(self.run_query::<Vec<T>>(groq, &[]).await?.unwrap_or_default())
    }

    /// Build a CDN URL for an image with this client's studio coordinates.
    pub fn image_url(&self, image: &ImageRef, transform: Transform) -> Option<String> {
        image::image_url(&self.config.project_id, &self.config.dataset, image, transform)
    }
}

#[async_trait]
impl ContentBackend for ContentClient {
    async fn hero(&self) -> Result<Option<HeroContent>, ContentError> {
        let mut hero = self.run_query::<HeroContent>(QUERY_HERO, &[]).await?;
        if let Some(h) = &mut hero {
            scrub_image(&mut h.hero_image);
            scrub_seo(&mut h.seo);
        }
        Ok(hero)
    }

    async fn skills(&self) -> Result<Vec<Skill>, ContentError> {
        let skills = self.run_collection(QUERY_SKILLS).await?;
        Ok(normalize_skills(skills))
    }

    async fn activities(&self) -> Result<Vec<Activity>, ContentError> {
        let activities = self.run_collection(QUERY_ACTIVITIES).await?;
        Ok(normalize_activities(activities))
    }

    async fn certifications(&self) -> Result<Vec<Certification>, ContentError> {
        let mut certs: Vec<Certification> = self.run_collection(QUERY_CERTIFICATIONS).await?;
        for cert in &mut certs {
            scrub_image(&mut cert.image);
        }
        certs.sort_by_key(|c| c.order);
        Ok(certs)
    }

    async fn experiences(&self) -> Result<Vec<Experience>, ContentError> {
        let experiences = self.run_collection(QUERY_EXPERIENCES).await?;
        Ok(normalize_experiences(experiences))
    }

    async fn education(&self) -> Result<Vec<Education>, ContentError> {
        let mut education: Vec<Education> = self.run_collection(QUERY_EDUCATION).await?;
        education.sort_by_key(|e| e.order);
        Ok(education)
    }

    async fn projects(&self) -> Result<Vec<Project>, ContentError> {
        let projects = self.run_collection(QUERY_PROJECTS).await?;
        Ok(normalize_projects(projects))
    }

    async fn featured_projects(&self) -> Result<Vec<Project>, ContentError> {
        let projects = self.run_collection(QUERY_FEATURED_PROJECTS).await?;
        Ok(normalize_projects(projects))
    }

    async fn site_settings(&self) -> Result<Option<SiteSettings>, ContentError> {
        self.run_query(QUERY_SITE_SETTINGS, &[]).await
    }

    async fn navigation(&self) -> Result<Vec<NavigationItem>, ContentError> {
        let mut items: Vec<NavigationItem> = self.run_collection(QUERY_NAVIGATION).await?;
        items.sort_by_key(|i| i.order);
        Ok(items)
    }

    async fn quick_links(&self) -> Result<Vec<QuickLink>, ContentError> {
        let mut links: Vec<QuickLink> = self.run_collection(QUERY_QUICK_LINKS).await?;
        links.sort_by_key(|l| l.order);
        Ok(links)
    }

    async fn page_content(&self, page_id: &str) -> Result<Option<PageContent>, ContentError> {
        let param = serde_json::Value::String(page_id.to_string());
        let mut page = self
            .run_query::<PageContent>(QUERY_PAGE_CONTENT, &[("pageId", &param)])
            .await?;
        if let Some(p) = &mut page {
            scrub_seo(&mut p.seo);
        }
        Ok(page)
    }
}

// ============================================================================
// Normalization
// ============================================================================

fn scrub_image(slot: &mut Option<ImageRef>) {
    if let Some(img) = slot {
        if !img.is_usable() {
            log::debug!("dropping unusable image reference {:?}", img.asset_ref());
            *slot = None;
        }
    }
}

fn scrub_seo(slot: &mut Option<Seo>) {
    if let Some(seo) = slot {
        scrub_image(&mut seo.og_image);
    }
}

fn normalize_skills(mut skills: Vec<Skill>) -> Vec<Skill> {
    for skill in &mut skills {
        skill.proficiency = skill.proficiency.min(100);
    }
    skills.sort_by_key(|s| s.order);
    skills
}

fn normalize_activities(mut activities: Vec<Activity>) -> Vec<Activity> {
    for activity in &mut activities {
        scrub_image(&mut activity.image);
        activity.images.retain(ImageRef::is_usable);
    }
    // Newest first; unparseable dates sort last.
    activities.sort_by(|a, b| {
        let a_date = parse_content_date(&a.date);
        let b_date = parse_content_date(&b.date);
        b_date.cmp(&a_date)
    });
    activities
}

fn normalize_experiences(mut experiences: Vec<Experience>) -> Vec<Experience> {
    for exp in &mut experiences {
        // A role marked current has no end date, whatever the document says.
        if exp.current {
            exp.end_date = None;
        }
    }
    experiences.sort_by_key(|e| e.order);
    experiences
}

fn normalize_projects(mut projects: Vec<Project>) -> Vec<Project> {
    for project in &mut projects {
        scrub_image(&mut project.image);
    }
    projects.sort_by_key(|p| p.order);
    projects
}
