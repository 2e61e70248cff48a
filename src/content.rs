// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Content Model
//!
//! The site is described in code rather than in content files. [`site_context`]
//! returns a fresh snapshot of the owner's identity, contact links, experience
//! history and selected work on every call; templates receive it as `site`.

use serde::Serialize;

/// Path prefix under which project pages are generated.
pub const WORK_PREFIX: &str = "/work/";

/// Site-wide metadata plus the page collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    /// Owner's display name.
    pub name: String,
    /// Job title shown in the header.
    pub role: String,
    /// Free-text location.
    pub location: String,
    /// Contact email address.
    pub email: String,
    /// Outbound links, in display order.
    pub links: Vec<Link>,
    /// Experience history, most recent first.
    pub experience: Vec<Experience>,
    /// Portfolio entries, in display order.
    pub selected_work: Vec<WorkItem>,
}

/// One entry of the ordered label-to-URL mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Visible label, unique within [`Site::links`].
    pub label: String,
    /// Absolute URL.
    pub url: String,
}

/// A position held at a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Experience {
    /// Employer name.
    pub company: String,
    /// Title held.
    pub title: String,
    /// Free-text range such as `2018 — 2021`.
    pub years: String,
    /// One-paragraph description.
    pub summary: String,
}

/// A portfolio entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    /// Project title.
    pub title: String,
    /// Output-relative URL, e.g. `/work/crosby/`.
    pub url: String,
    /// Year shipped.
    pub year: String,
    /// Role on the project.
    pub role: String,
    /// Short description.
    pub summary: String,
    /// Free-text tags, in display order.
    pub tags: Vec<String>,
}

impl WorkItem {
    /// Returns the project slug when `url` has the form `/work/<slug>/`.
    ///
    /// URLs outside `/work/`, or nested deeper than one segment, have no slug.
    pub fn slug(&self) -> Option<&str> {
        let rest = self.url.strip_prefix(WORK_PREFIX)?;
        let slug = rest.strip_suffix('/').unwrap_or(rest);
        let valid = !slug.is_empty()
            && !slug.contains('/')
            && slug != "."
            && slug != "..";
        valid.then_some(slug)
    }
}

fn link(label: &str, url: &str) -> Link {
    Link {
        label: label.to_string(),
        url: url.to_string(),
    }
}

fn experience(company: &str, title: &str, years: &str, summary: &str) -> Experience {
    Experience {
        company: company.to_string(),
        title: title.to_string(),
        years: years.to_string(),
        summary: summary.to_string(),
    }
}

fn work_item(
    title: &str,
    url: &str,
    year: &str,
    role: &str,
    summary: &str,
    tags: &[&str],
) -> WorkItem {
    WorkItem {
        title: title.to_string(),
        url: url.to_string(),
        year: year.to_string(),
        role: role.to_string(),
        summary: summary.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
    }
}

/// Returns the site content.
///
/// Pure: every call yields a structurally equal value.
pub fn site_context() -> Site {
    Site {
        name: "Arefeh Ghadirinasab".to_string(),
        role: "UX/Graphic Designer".to_string(),
        location: "City, Country".to_string(),
        email: "arefeh.ghadirinasab@gmail.com".to_string(),
        links: vec![
            link(
                "LinkedIn",
                "https://www.linkedin.com/in/arefeh-ghadirinasab-45b4257a/?originalSubdomain=ir",
            ),
            link("Instagram", "https://www.instagram.com/arefeh_ghadirinasab/"),
        ],
        experience: vec![
            experience(
                "Crosby",
                "Senior UX Designer",
                "2025 — Present",
                "Leading the design and strategy of Crosby’s retail POS tool across mobile and in-store platforms.",
            ),
            experience(
                "Norman & Co",
                "Lead Product Designer",
                "2018 — 2021",
                "Led product design for the core platform, improving onboarding and reducing time-to-value.",
            ),
        ],
        selected_work: vec![
            work_item(
                "Crosby: POS Tool Launch",
                "/work/crosby/",
                "2026",
                "Senior UX Designer",
                "End-to-end POS workflow improvements across mobile and in-store touchpoints.",
                &["UX", "Product", "Enterprise"],
            ),
            work_item(
                "Norman & Co: Scout Product Launch",
                "/work/project-two/",
                "2025",
                "Lead Product Designer",
                "Launched a new product experience with improved onboarding and faster time-to-value.",
                &["UX", "Strategy"],
            ),
            work_item(
                "Gardona: Online Store Redesign",
                "/work/gardona-store/",
                "2024",
                "UX / Visual Design",
                "Redesigned commerce flows and visual system to improve clarity and conversion.",
                &["E-commerce", "UI"],
            ),
            work_item(
                "Carmine: Skycast App Launch",
                "/work/carmine-skycast/",
                "2024",
                "Product Design",
                "Designed core interactions and visual hierarchy for a new app experience.",
                &["Mobile", "UI"],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with_url(url: &str) -> WorkItem {
        work_item("t", url, "2024", "r", "s", &[])
    }

    #[test]
    fn test_site_context_is_pure() {
        assert_eq!(site_context(), site_context());
    }

    #[test]
    fn test_links_keep_declaration_order() {
        let site = site_context();
        let labels: Vec<&str> =
            site.links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["LinkedIn", "Instagram"]);
        assert_eq!(
            site.links[1].url,
            "https://www.instagram.com/arefeh_ghadirinasab/"
        );
    }

    #[test]
    fn test_selected_work_urls_are_distinct() {
        let site = site_context();
        let mut urls: Vec<&str> =
            site.selected_work.iter().map(|w| w.url.as_str()).collect();
        urls.sort_unstable();
        urls.dedup();
        assert_eq!(urls.len(), site.selected_work.len());
    }

    #[test]
    fn test_slug_extraction() {
        assert_eq!(item_with_url("/work/crosby/").slug(), Some("crosby"));
        assert_eq!(item_with_url("/work/crosby").slug(), Some("crosby"));
        assert_eq!(item_with_url("/crosby-pos/").slug(), None);
        assert_eq!(item_with_url("/work/").slug(), None);
        assert_eq!(item_with_url("/work/a/b/").slug(), None);
        assert_eq!(item_with_url("/work/../").slug(), None);
        assert_eq!(item_with_url("https://example.com/work/x/").slug(), None);
    }

    #[test]
    fn test_serializes_for_templates() {
        let value = serde_json::to_value(site_context()).unwrap();
        assert_eq!(value["name"], "Arefeh Ghadirinasab");
        assert_eq!(value["links"][0]["label"], "LinkedIn");
        assert_eq!(value["selected_work"][0]["tags"][2], "Enterprise");
    }
}
