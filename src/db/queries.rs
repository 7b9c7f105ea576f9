use mongodb::bson::{doc, Document};

use super::models::Organization;

/// Which organizations a run should process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The most recent record (highest `canonical_id`) with this slug.
    Single(String),
    /// Every record whose slug is in the list.
    List(Vec<String>),
    /// Eligible records that have no published logo URL yet.
    MissingPublishedUrl,
    /// Every eligible record, published or not.
    AllEligible,
}

impl Selection {
    /// Build a selection from the command-line flags.
    ///
    /// A single test org wins over a slug list; with neither, `default` applies.
    #[must_use]
    pub fn from_flags(test_org: Option<String>, orgs: Vec<String>, default: Self) -> Self {
        match (test_org, orgs) {
            (Some(slug), _) => Self::Single(slug),
            (None, slugs) if !slugs.is_empty() => Self::List(slugs),
            _ => default,
        }
    }

    /// Query filter for the `organizations` collection.
    #[must_use]
    pub fn filter(&self) -> Document {
        match self {
            Self::Single(slug) => doc! { "slug": slug.as_str() },
            Self::List(slugs) => doc! { "slug": { "$in": slugs.clone() } },
            Self::MissingPublishedUrl => doc! {
                "$and": [
                    {
                        "$or": [
                            { "logo_r2_url": { "$exists": false } },
                            { "logo_r2_url": null },
                            { "logo_r2_url": "" }
                        ]
                    },
                    has_source_url(),
                    non_empty_field("image_slug")
                ]
            },
            Self::AllEligible => doc! {
                "$and": [has_source_url(), non_empty_field("image_slug")]
            },
        }
    }

    /// Sort order and result limit that go with [`Selection::filter`].
    #[must_use]
    pub fn sort_and_limit(&self) -> Option<(Document, i64)> {
        match self {
            Self::Single(_) => Some((doc! { "canonical_id": -1 }, 1)),
            _ => None,
        }
    }

    /// Whether `org` satisfies this selection's filter.
    ///
    /// Mirrors [`Selection::filter`] for a single document; ordering and the
    /// limit of [`Selection::Single`] are not applied here.
    #[must_use]
    pub fn matches(&self, org: &Organization) -> bool {
        match self {
            Self::Single(slug) => org.slug.as_deref() == Some(slug.as_str()),
            Self::List(slugs) => org
                .slug
                .as_deref()
                .is_some_and(|s| slugs.iter().any(|wanted| wanted == s)),
            Self::MissingPublishedUrl => !org.is_published() && is_eligible(org),
            Self::AllEligible => is_eligible(org),
        }
    }

    /// Short description for log lines.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Single(slug) => format!("test mode, single org '{slug}'"),
            Self::List(slugs) => format!("{} specified orgs", slugs.len()),
            Self::MissingPublishedUrl => "all orgs without a published logo".to_string(),
            Self::AllEligible => "all orgs with a logo URL and image slug".to_string(),
        }
    }
}

/// A record can be processed only with an image slug and a source URL.
fn is_eligible(org: &Organization) -> bool {
    org.image_slug().is_some() && org.source_url().is_some()
}

fn has_source_url() -> Document {
    doc! {
        "$or": [non_empty_field("image_url"), non_empty_field("logoUrl")]
    }
}

fn non_empty_field(field: &str) -> Document {
    let mut clause = Document::new();
    clause.insert(field, doc! { "$exists": true, "$nin": [null, ""] });
    clause
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(slug: &str) -> Organization {
        Organization {
            canonical_id: Some(format!("gsoc-{slug}-2024")),
            slug: Some(slug.to_string()),
            image_slug: Some(slug.to_string()),
            image_url: Some(format!("https://host/{slug}.png")),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_flags_precedence() {
        let selection = Selection::from_flags(
            Some("unikraft".to_string()),
            vec!["jitsi".to_string()],
            Selection::MissingPublishedUrl,
        );
        assert_eq!(selection, Selection::Single("unikraft".to_string()));

        let selection =
            Selection::from_flags(None, vec!["jitsi".to_string()], Selection::AllEligible);
        assert_eq!(selection, Selection::List(vec!["jitsi".to_string()]));

        let selection = Selection::from_flags(None, Vec::new(), Selection::AllEligible);
        assert_eq!(selection, Selection::AllEligible);
    }

    #[test]
    fn test_single_filter_sorts_descending_and_limits() {
        let selection = Selection::Single("unikraft".to_string());
        assert_eq!(selection.filter(), doc! { "slug": "unikraft" });
        assert_eq!(
            selection.sort_and_limit(),
            Some((doc! { "canonical_id": -1 }, 1))
        );
        assert_eq!(Selection::AllEligible.sort_and_limit(), None);
    }

    #[test]
    fn test_list_filter_uses_in() {
        let selection = Selection::List(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(selection.filter(), doc! { "slug": { "$in": ["a", "b"] } });
    }

    #[test]
    fn test_missing_published_filter() {
        assert_eq!(
            Selection::MissingPublishedUrl.filter(),
            doc! {
                "$and": [
                    {
                        "$or": [
                            { "logo_r2_url": { "$exists": false } },
                            { "logo_r2_url": null },
                            { "logo_r2_url": "" }
                        ]
                    },
                    {
                        "$or": [
                            { "image_url": { "$exists": true, "$nin": [null, ""] } },
                            { "logoUrl": { "$exists": true, "$nin": [null, ""] } }
                        ]
                    },
                    { "image_slug": { "$exists": true, "$nin": [null, ""] } }
                ]
            }
        );
    }

    #[test]
    fn test_all_eligible_filter() {
        assert_eq!(
            Selection::AllEligible.filter(),
            doc! {
                "$and": [
                    {
                        "$or": [
                            { "image_url": { "$exists": true, "$nin": [null, ""] } },
                            { "logoUrl": { "$exists": true, "$nin": [null, ""] } }
                        ]
                    },
                    { "image_slug": { "$exists": true, "$nin": [null, ""] } }
                ]
            }
        );
    }

    #[test]
    fn test_missing_published_excludes_published_records() {
        let mut published = org("unikraft");
        published.logo_r2_url = Some("https://cdn/unikraft.png".to_string());
        assert!(!Selection::MissingPublishedUrl.matches(&published));
        assert!(Selection::AllEligible.matches(&published));

        let mut empty_url = org("jitsi");
        empty_url.logo_r2_url = Some(String::new());
        assert!(Selection::MissingPublishedUrl.matches(&empty_url));
    }

    #[test]
    fn test_missing_published_excludes_ineligible_records() {
        let mut no_source = org("oppia");
        no_source.image_url = None;
        no_source.logo_url = Some(String::new());
        assert!(!Selection::MissingPublishedUrl.matches(&no_source));

        let mut legacy = org("oppia");
        legacy.image_url = None;
        legacy.logo_url = Some("https://host/oppia.svg".to_string());
        assert!(Selection::MissingPublishedUrl.matches(&legacy));

        let mut no_slug = org("gnome");
        no_slug.image_slug = None;
        assert!(!Selection::MissingPublishedUrl.matches(&no_slug));
    }

    #[test]
    fn test_slug_selections_ignore_eligibility() {
        let mut published = org("unikraft");
        published.logo_r2_url = Some("https://cdn/unikraft.png".to_string());
        published.image_slug = None;

        assert!(Selection::Single("unikraft".to_string()).matches(&published));
        assert!(Selection::List(vec!["unikraft".to_string()]).matches(&published));
        assert!(!Selection::List(vec!["jitsi".to_string()]).matches(&published));
    }
}
