// Project and organization endpoints

use serde::Serialize;
use tracing::debug;

use crate::client::ProjectClient;
use crate::error::Error;
use crate::models::{OrganizationDetails, ProjectDetails, UpdateResponse};

impl ProjectClient {
    /// Fetch a project with its option values and configuration descriptors.
    ///
    /// `GET /projects/{org}/{project}/`
    pub async fn get_project(&self, org: &str, project: &str) -> Result<ProjectDetails, Error> {
        let url = self.endpoint(&["projects", org, project])?;
        debug!(org, project, "fetching project");
        self.get(url).await
    }

    /// Replace the project's settings with `body`.
    ///
    /// `PUT /projects/{org}/{project}/`. The body is sent as-is (full
    /// replace, not a diff).
    pub async fn update_project(
        &self,
        org: &str,
        project: &str,
        body: &impl Serialize,
    ) -> Result<UpdateResponse, Error> {
        let url = self.endpoint(&["projects", org, project])?;
        debug!(org, project, "updating project");
        self.put(url, body).await
    }

    /// Fetch an organization with its teams and the viewer's membership.
    ///
    /// `GET /organizations/{org}/`
    pub async fn get_organization(&self, org: &str) -> Result<OrganizationDetails, Error> {
        let url = self.endpoint(&["organizations", org])?;
        debug!(org, "fetching organization");
        self.get(url).await
    }
}
