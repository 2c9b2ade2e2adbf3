//! Site singleton entities built from `[site]` configuration.

use ldgraph_shared::{
    Blog, BlogRef, ImageObject, Organization, OrganizationRef, SiteConfig, WebSite, ids,
};

/// The Organization, WebSite and Blog every graph carries exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteEntities {
    pub organization: Organization,
    pub website: WebSite,
    pub blog: Blog,
    /// `@id` and name of the ItemList built per run.
    pub item_list_id: String,
    pub item_list_name: String,
}

impl SiteEntities {
    pub fn from_config(site: &SiteConfig) -> Self {
        let site_url = site.site_url();
        let blog_url = site.blog_url();

        let organization = Organization {
            id: ids::organization_id(&site_url),
            name: site.name.clone(),
            url: site_url.clone(),
            logo: ImageObject::new(&site.logo_url, site.logo_width, site.logo_height),
            same_as: site.same_as.clone(),
        };
        let publisher = OrganizationRef::from(&organization);

        let website = WebSite {
            id: ids::website_id(&site_url),
            url: site_url.clone(),
            name: site.name.clone(),
            description: site.description.clone(),
            in_language: site.language.clone(),
            publisher: publisher.clone(),
        };

        let blog = Blog {
            id: ids::blog_id(&blog_url),
            url: blog_url,
            name: site.blog_name.clone(),
            description: site.blog_description.clone(),
            in_language: site.language.clone(),
            publisher,
        };

        Self {
            organization,
            website,
            blog,
            item_list_id: ids::item_list_id(&site_url),
            item_list_name: site.item_list_name.clone(),
        }
    }

    /// Typed publisher / copyright holder reference.
    pub fn publisher(&self) -> OrganizationRef {
        OrganizationRef::from(&self.organization)
    }

    /// Typed parent-collection reference.
    pub fn blog_ref(&self) -> BlogRef {
        BlogRef::from(&self.blog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_site_and_blog_urls() {
        let site = SiteEntities::from_config(&SiteConfig::default());
        assert_eq!(site.organization.id, "https://www.example-photo-school.com/#organization");
        assert_eq!(site.website.id, "https://www.example-photo-school.com/#website");
        assert_eq!(site.blog.id, "https://www.example-photo-school.com/blog#blog");
        assert_eq!(site.item_list_id, "https://www.example-photo-school.com/#itemlist");
    }

    #[test]
    fn explicit_blog_url_is_normalized() {
        let config = SiteConfig {
            blog_url: Some("https://blog.example.com/".into()),
            ..SiteConfig::default()
        };
        let site = SiteEntities::from_config(&config);
        assert_eq!(site.blog.url, "https://blog.example.com");
        assert_eq!(site.blog_ref().id, "https://blog.example.com#blog");
        assert_eq!(site.publisher().kind, "Organization");
    }
}
