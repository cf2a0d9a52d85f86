//! Static fallback content.
//!
//! Used when the store runs with `EmptyPolicy::Fallback`: any empty or
//! failed remote outcome is replaced by these records so every page has
//! something to render. Image fields stay `None` — there is no asset to
//! point at when the studio is empty, and pages already fall back to an
//! icon or placeholder for missing images.

use crate::types::{
    Activity, Certification, Cta, Education, Experience, HeroContent, NavigationItem, PageContent,
    Project, QuickLink, SiteSettings, Skill, SocialLinks,
};

pub fn hero() -> HeroContent {
    HeroContent {
        id: "fallback-hero".to_string(),
        title: "Mechanical Design Engineer".to_string(),
        subtitle: "CAD · Simulation · Prototyping".to_string(),
        tagline: "I turn rough ideas into manufacturable parts.".to_string(),
        cta_primary: Some(Cta {
            text: "View My Work".to_string(),
            link: "/designs".to_string(),
        }),
        cta_secondary: Some(Cta {
            text: "Get in Touch".to_string(),
            link: "/contact".to_string(),
        }),
        hero_image: None,
        seo: None,
    }
}

pub fn skills() -> Vec<Skill> {
    let skill = |id: &str, name: &str, category: &str, proficiency: u32, order: i64| Skill {
        id: format!("fallback-skill-{id}"),
        name: name.to_string(),
        category: category.to_string(),
        proficiency,
        icon: None,
        description: None,
        order,
    };

    vec![
        skill("autocad", "AutoCAD", "2D Design", 95, 1),
        skill("solidworks", "SolidWorks", "3D Modeling", 90, 2),
        skill("fusion", "Fusion 360", "3D Modeling", 85, 3),
        skill("ansys", "ANSYS", "Simulation", 75, 4),
        skill("keyshot", "KeyShot", "Rendering", 80, 5),
    ]
}

pub fn activities() -> Vec<Activity> {
    vec![Activity {
        id: "fallback-activity-1".to_string(),
        title: "Portfolio refresh".to_string(),
        description: "Rebuilt the portfolio with a new design catalogue.".to_string(),
        date: "2025-01-15".to_string(),
        category: "Announcement".to_string(),
        image: None,
        images: Vec::new(),
        link: None,
    }]
}

pub fn certifications() -> Vec<Certification> {
    let cert = |id: &str, title: &str, issuer: &str, year: &str, order: i64| Certification {
        id: format!("fallback-cert-{id}"),
        title: title.to_string(),
        issuer: issuer.to_string(),
        year: year.to_string(),
        credential_id: None,
        credential_url: None,
        image: None,
        order,
    };

    vec![
        cert("cswa", "Certified SolidWorks Associate", "Dassault Systèmes", "2022", 1),
        cert("cswp", "Certified SolidWorks Professional", "Dassault Systèmes", "2023", 2),
    ]
}

pub fn experiences() -> Vec<Experience> {
    vec![Experience {
        id: "fallback-exp-1".to_string(),
        title: "Design Engineer".to_string(),
        company: "Freelance".to_string(),
        location: "Remote".to_string(),
        start_date: "2021-01-01".to_string(),
        end_date: None,
        current: true,
        description: vec![
            "Product design from concept sketch to production drawings.".to_string(),
            "Client prototyping support and design-for-manufacture reviews.".to_string(),
        ],
        order: 1,
    }]
}

pub fn education() -> Vec<Education> {
    vec![Education {
        id: "fallback-edu-1".to_string(),
        degree: "B.Sc. Mechanical Engineering".to_string(),
        institution: "University".to_string(),
        location: String::new(),
        start_year: "2016".to_string(),
        end_year: "2020".to_string(),
        description: None,
        order: 1,
    }]
}

pub fn projects() -> Vec<Project> {
    vec![Project {
        id: "fallback-project-1".to_string(),
        title: "Planetary Gearbox".to_string(),
        category: "Mechanical".to_string(),
        description: "Compact 3-stage planetary gearbox designed for a robotics actuator."
            .to_string(),
        image: None,
        problem: None,
        solution: None,
        tools: vec!["SolidWorks".to_string(), "ANSYS".to_string()],
        featured: true,
        order: 1,
    }]
}

pub fn featured_projects() -> Vec<Project> {
    projects().into_iter().filter(|p| p.featured).collect()
}

pub fn site_settings() -> SiteSettings {
    SiteSettings {
        id: "fallback-settings".to_string(),
        name: "Folio".to_string(),
        tagline: "Mechanical design portfolio".to_string(),
        email: "hello@example.com".to_string(),
        phone: None,
        location: None,
        resume_url: None,
        social_links: SocialLinks::default(),
    }
}

pub fn navigation() -> Vec<NavigationItem> {
    let item = |id: &str, label: &str, path: &str, order: i64| NavigationItem {
        id: format!("fallback-nav-{id}"),
        label: label.to_string(),
        path: path.to_string(),
        order,
    };

    vec![
        item("home", "Home", "/", 1),
        item("skills", "Skills", "/skills", 2),
        item("certifications", "Certifications", "/certifications", 3),
        item("cv", "CV", "/cv", 4),
        item("designs", "Designs", "/designs", 5),
        item("activities", "Activities", "/activities", 6),
        item("contact", "Contact", "/contact", 7),
    ]
}

pub fn quick_links() -> Vec<QuickLink> {
    vec![QuickLink {
        id: "fallback-link-cv".to_string(),
        title: "Curriculum Vitae".to_string(),
        link: "/cv".to_string(),
        description: Some("Experience, education and certifications.".to_string()),
        order: 1,
    }]
}

/// Fallback heading copy for the known page ids. Unknown ids get nothing —
/// the store keeps the empty outcome in that case.
pub fn page_content(page_id: &str) -> Option<PageContent> {
    let page = |title: &str, subtitle: &str, description: &str| PageContent {
        id: format!("fallback-page-{page_id}"),
        page_id: page_id.to_string(),
        title: title.to_string(),
        subtitle: Some(subtitle.to_string()),
        description: Some(description.to_string()),
        seo: None,
    };

    match page_id {
        "home" => Some(page("Welcome", "PORTFOLIO", "Selected design work and activities.")),
        "skills" => Some(page("Skills", "WHAT I USE", "Tools and proficiencies.")),
        "certifications" => Some(page(
            "Certifications",
            "CREDENTIALS",
            "Professional certifications and credentials.",
        )),
        "cv" => Some(page("Curriculum Vitae", "BACKGROUND", "Experience and education.")),
        "designs" => Some(page("Designs", "SELECTED WORK", "A catalogue of design projects.")),
        "activities" => Some(page(
            "Recent Activities",
            "WHAT'S NEW",
            "Talks, publications and project updates.",
        )),
        "contact" => Some(page("Contact", "GET IN TOUCH", "Get in touch")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_collections_come_pre_sorted() {
        let skills = skills();
        assert!(skills.windows(2).all(|w| w[0].order <= w[1].order));

        let nav = navigation();
        assert!(nav.windows(2).all(|w| w[0].order <= w[1].order));
    }

    #[test]
    fn test_contact_page_fallback_copy() {
        let page = page_content("contact").unwrap();
        assert_eq!(page.title, "Contact");
        assert_eq!(page.description.as_deref(), Some("Get in touch"));
    }

    #[test]
    fn test_unknown_page_has_no_fallback() {
        assert!(page_content("blog").is_none());
    }

    #[test]
    fn test_featured_projects_is_featured_subset() {
        assert!(featured_projects().iter().all(|p| p.featured));
    }
}
