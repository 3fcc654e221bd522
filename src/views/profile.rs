//! Profile page

use async_trait::async_trait;
use indexmap::IndexSet;
use serde::Serialize;

use super::PageLoader;
use crate::content::{ContentError, ContentSource, PostId, Profile};
use crate::helpers::display_url;

/// A contact link as shown on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactLink {
    pub label: &'static str,
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
    pub profile: Profile,
    pub links: Vec<ContactLink>,
}

impl ProfilePage {
    pub fn new(profile: Profile) -> Self {
        let contact = &profile.contact;
        let mut links = Vec::new();

        if let Some(email) = contact.email.as_deref().filter(|e| !e.is_empty()) {
            links.push(ContactLink {
                label: "Email",
                href: format!("mailto:{}", email),
                text: email.to_string(),
            });
        }
        for (label, url) in [("LinkedIn", &contact.linkedin), ("GitHub", &contact.github)] {
            if let Some(url) = url.as_deref().filter(|u| !u.is_empty()) {
                links.push(ContactLink {
                    label,
                    href: url.to_string(),
                    text: display_url(url),
                });
            }
        }

        Self { profile, links }
    }
}

pub struct ProfileLoader;

#[async_trait]
impl PageLoader for ProfileLoader {
    type Output = ProfilePage;

    async fn load(
        &self,
        source: &dyn ContentSource,
        _saved: &IndexSet<PostId>,
    ) -> Result<Option<Self::Output>, ContentError> {
        let profile = source.get_profile().await?;
        Ok(Some(ProfilePage::new(profile)))
    }

    fn visible_ids(_output: &Self::Output) -> Vec<PostId> {
        Vec::new()
    }

    fn error_message(&self) -> &'static str {
        "Failed to load the profile. Please try again."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::FakeSource;
    use crate::content::Contact;

    #[test]
    fn test_contact_links_drop_scheme() {
        let profile = Profile {
            contact: Contact {
                email: Some("ada@example.com".to_string()),
                linkedin: Some("https://www.linkedin.com/in/ada/".to_string()),
                github: Some("https://github.com/ada".to_string()),
            },
            ..Default::default()
        };

        let page = ProfilePage::new(profile);
        let texts: Vec<_> = page.links.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["ada@example.com", "www.linkedin.com/in/ada", "github.com/ada"]);
        assert_eq!(page.links[0].href, "mailto:ada@example.com");
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let source = FakeSource::sample();
        let result = ProfileLoader.load(&source, &IndexSet::new()).await;
        assert!(matches!(result, Err(ContentError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_loads_profile() {
        let source = FakeSource::sample().with_profile(Profile {
            name: "Ada".to_string(),
            skills: vec!["Rust".to_string()],
            ..Default::default()
        });
        let page = ProfileLoader.load(&source, &IndexSet::new()).await.unwrap().unwrap();
        assert_eq!(page.profile.name, "Ada");
        assert!(page.links.is_empty());
    }
}
