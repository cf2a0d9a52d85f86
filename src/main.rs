//! folio-preview — one-shot studio content check.
//!
//! Loads the studio config, fetches every content section through the
//! cached store, and logs a one-line summary per section. Useful after
//! editing content or rotating datasets: a section that comes back empty
//! or failed here is exactly what the site will render an empty-state for.

use std::process::ExitCode;

use folio_content::{ContentConfig, ContentState, ContentStore};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ContentConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "studio {} / dataset {} (onEmpty: {:?})",
        config.project_id,
        config.dataset,
        config.on_empty,
    );

    let store = ContentStore::from_config(config);

    let (
        hero,
        skills,
        activities,
        certifications,
        experiences,
        education,
        projects,
        featured,
        settings,
        navigation,
        quick_links,
        contact,
    ) = tokio::join!(
        store.hero(),
        store.skills(),
        store.activities(),
        store.certifications(),
        store.experiences(),
        store.education(),
        store.projects(),
        store.featured_projects(),
        store.site_settings(),
        store.navigation(),
        store.quick_links(),
        store.page_content("contact"),
    );

    let mut healthy = true;
    healthy &= report_one("hero", &hero);
    healthy &= report_list("skills", &skills);
    healthy &= report_list("activities", &activities);
    healthy &= report_list("certifications", &certifications);
    healthy &= report_list("experiences", &experiences);
    healthy &= report_list("education", &education);
    healthy &= report_list("projects", &projects);
    healthy &= report_list("featuredProjects", &featured);
    healthy &= report_one("siteSettings", &settings);
    healthy &= report_list("navigation", &navigation);
    healthy &= report_list("quickLinks", &quick_links);
    healthy &= report_one("pageContent:contact", &contact);

    if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn report_one<T>(name: &str, state: &ContentState<T>) -> bool {
    match state {
        ContentState::Loaded(_) => {
            log::info!("{name}: ok");
            true
        }
        ContentState::Empty => {
            log::warn!("{name}: no content configured");
            false
        }
        ContentState::Failed(reason) => {
            log::error!("{name}: fetch failed ({reason})");
            false
        }
        ContentState::Loading => {
            log::warn!("{name}: still loading");
            false
        }
    }
}

fn report_list<T>(name: &str, state: &ContentState<Vec<T>>) -> bool {
    match state {
        ContentState::Loaded(items) => {
            log::info!("{name}: {} item(s)", items.len());
            true
        }
        ContentState::Empty => {
            log::warn!("{name}: no content configured");
            false
        }
        ContentState::Failed(reason) => {
            log::error!("{name}: fetch failed ({reason})");
            false
        }
        ContentState::Loading => {
            log::warn!("{name}: still loading");
            false
        }
    }
}
